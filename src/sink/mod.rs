//! sink
//!
//! Outputs for an assembled [`MetadataSet`](crate::core::metadata::MetadataSet).
//!
//! # Modules
//!
//! - [`properties`] - Prefixed property table (properties text or JSON)
//! - [`template`] - `{KEY}` placeholder rendering and filtered copy
//! - [`info_source`] - Generated source file describing the build
//!
//! # Writes
//!
//! Every file write goes through one atomic path: render fully in memory,
//! encode, then write a sibling temp file and rename it over the target.
//! A target that already holds identical bytes is left untouched, so
//! re-running a sink with the same metadata is a no-op.

pub mod info_source;
pub mod properties;
pub mod template;

pub use info_source::InfoSource;
pub use properties::PropertyTable;
pub use template::{filter_copy, render};

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Errors from writing metadata out.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to read template '{path}': {source}")]
    TemplateSource {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    #[error("character {ch:?} cannot be encoded as {encoding}")]
    Unencodable { ch: char, encoding: TextEncoding },

    #[error("failed to serialize properties: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Text encodings a sink can write.
///
/// # Example
///
/// ```
/// use gitmeta::sink::TextEncoding;
///
/// let latin1: TextEncoding = "iso-8859-1".parse().unwrap();
/// assert_eq!(latin1.encode("é").unwrap(), vec![0xE9]);
/// assert!(TextEncoding::Ascii.encode("é").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl TextEncoding {
    /// Encode `text`, failing on the first character the encoding lacks.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, SinkError> {
        let limit = match self {
            TextEncoding::Utf8 => return Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => 0xFF,
            TextEncoding::Ascii => 0x7F,
        };

        text.chars()
            .map(|ch| {
                let code = u32::from(ch);
                if code <= limit {
                    Ok(code as u8)
                } else {
                    Err(SinkError::Unencodable { ch, encoding: self })
                }
            })
            .collect()
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "utf8" => Ok(TextEncoding::Utf8),
            "iso88591" | "latin1" => Ok(TextEncoding::Latin1),
            "usascii" | "ascii" => Ok(TextEncoding::Ascii),
            _ => Err(format!(
                "unsupported encoding '{s}', must be one of: UTF-8, ISO-8859-1, US-ASCII"
            )),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("UTF-8"),
            TextEncoding::Latin1 => f.write_str("ISO-8859-1"),
            TextEncoding::Ascii => f.write_str("US-ASCII"),
        }
    }
}

/// What a write did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The target was created or replaced.
    Written,
    /// The target already held these exact bytes.
    Unchanged,
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> SinkError + '_ {
    move |source| SinkError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `contents` to `path` atomically, creating parent directories.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<CopyOutcome, SinkError> {
    if let Ok(existing) = fs::read(path) {
        if existing == contents {
            return Ok(CopyOutcome::Unchanged);
        }
    }

    let file_name = path.file_name().ok_or_else(|| SinkError::Write {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"),
    })?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error(path))?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = write_then_rename(&temp_path, path, contents);
    if result.is_err() {
        // Best effort cleanup
        let _ = fs::remove_file(&temp_path);
    }
    result?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(CopyOutcome::Written)
}

fn write_then_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> Result<(), SinkError> {
    let mut file = fs::File::create(temp_path).map_err(write_error(temp_path))?;
    file.write_all(contents).map_err(write_error(temp_path))?;
    file.sync_all().map_err(write_error(temp_path))?;
    drop(file);

    fs::rename(temp_path, path).map_err(write_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod encoding {
        use super::*;

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!("UTF-8".parse(), Ok(TextEncoding::Utf8));
            assert_eq!("utf8".parse(), Ok(TextEncoding::Utf8));
            assert_eq!("ISO-8859-1".parse(), Ok(TextEncoding::Latin1));
            assert_eq!("Latin1".parse(), Ok(TextEncoding::Latin1));
            assert_eq!("us-ascii".parse(), Ok(TextEncoding::Ascii));
            assert!("EBCDIC".parse::<TextEncoding>().is_err());
        }

        #[test]
        fn display_round_trips() {
            for enc in [TextEncoding::Utf8, TextEncoding::Latin1, TextEncoding::Ascii] {
                assert_eq!(enc.to_string().parse(), Ok(enc));
            }
        }

        #[test]
        fn latin1_single_bytes() {
            assert_eq!(TextEncoding::Latin1.encode("Aé").unwrap(), vec![0x41, 0xE9]);
            assert!(matches!(
                TextEncoding::Latin1.encode("€"),
                Err(SinkError::Unencodable { ch: '€', .. })
            ));
        }

        #[test]
        fn utf8_passes_through() {
            assert_eq!(TextEncoding::Utf8.encode("€").unwrap(), "€".as_bytes());
        }
    }

    mod atomic {
        use super::*;

        #[test]
        fn creates_parents_and_skips_identical() {
            let temp = TempDir::new().unwrap();
            let target = temp.path().join("a/b/out.txt");

            assert_eq!(write_atomic(&target, b"one").unwrap(), CopyOutcome::Written);
            assert_eq!(fs::read(&target).unwrap(), b"one");
            assert_eq!(write_atomic(&target, b"one").unwrap(), CopyOutcome::Unchanged);
            assert_eq!(write_atomic(&target, b"two").unwrap(), CopyOutcome::Written);
            assert_eq!(fs::read(&target).unwrap(), b"two");
        }

        #[test]
        fn leaves_no_temp_file() {
            let temp = TempDir::new().unwrap();
            let target = temp.path().join("out.txt");
            write_atomic(&target, b"data").unwrap();

            let names: Vec<_> = fs::read_dir(temp.path())
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .collect();
            assert_eq!(names, vec![std::ffi::OsString::from("out.txt")]);
        }

        #[test]
        fn failed_rename_removes_temp_file() {
            let temp = TempDir::new().unwrap();
            let target = temp.path().join("out");
            fs::create_dir(&target).unwrap();
            fs::write(target.join("keep.txt"), "x").unwrap();

            let result = write_atomic(&target, b"data");
            assert!(matches!(result, Err(SinkError::Write { .. })));
            assert!(!temp.path().join(".out.tmp").exists());
            assert!(target.is_dir());
        }
    }
}
