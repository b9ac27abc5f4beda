//! sink::template
//!
//! `{KEY}` placeholder substitution.
//!
//! A placeholder is `{` followed by one or more of `A-Z`, `0-9`, `_` and a
//! closing `}`. Placeholders naming a key in the metadata set are replaced
//! by its value; everything else, including unknown placeholders and stray
//! braces, is copied verbatim. Substituted values are not scanned again.

use std::fs;
use std::path::Path;

use super::{write_atomic, CopyOutcome, SinkError, TextEncoding};
use crate::core::metadata::MetadataSet;

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// Substitute every known `{KEY}` in `template`.
///
/// # Example
///
/// ```
/// use gitmeta::core::metadata::MetadataSet;
/// use gitmeta::sink::render;
///
/// let mut set = MetadataSet::new();
/// set.insert("BRANCH", "main");
///
/// assert_eq!(render("on {BRANCH} {UNKNOWN} {x}", &set), "on main {UNKNOWN} {x}");
/// ```
pub fn render(template: &str, set: &MetadataSet) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let key_len = after.bytes().take_while(|b| is_key_byte(*b)).count();
        if key_len > 0 && after.as_bytes().get(key_len) == Some(&b'}') {
            if let Some(value) = set.get(&after[..key_len]) {
                out.push_str(value);
                rest = &after[key_len + 1..];
                continue;
            }
        }

        out.push('{');
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Render `template` and write it to `target` in `encoding`.
pub fn write_rendered(
    template: &str,
    target: &Path,
    set: &MetadataSet,
    encoding: TextEncoding,
) -> Result<CopyOutcome, SinkError> {
    let bytes = encoding.encode(&render(template, set))?;
    write_atomic(target, &bytes)
}

/// Copy `source` to `target`, substituting placeholders on the way.
///
/// The source is read as UTF-8. The target's parent directories are
/// created as needed and the write is atomic. A target that already holds
/// the rendered bytes is left untouched.
///
/// # Errors
///
/// - [`SinkError::TemplateSource`] if the source cannot be read
/// - [`SinkError::Unencodable`] if the output does not fit `encoding`
/// - [`SinkError::Write`] if the target cannot be written
pub fn filter_copy(
    source: &Path,
    target: &Path,
    set: &MetadataSet,
    encoding: TextEncoding,
) -> Result<CopyOutcome, SinkError> {
    let template = fs::read_to_string(source).map_err(|e| SinkError::TemplateSource {
        path: source.to_path_buf(),
        source: e,
    })?;

    write_rendered(&template, target, set, encoding)
}
