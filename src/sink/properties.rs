//! sink::properties
//!
//! Prefixed property table.
//!
//! Each metadata key is published once per prefix namespace
//! (`gitmeta.commit.abbrev`, `git.commit.abbrev`, ...). The table is sorted
//! by key so rendered output is stable across runs.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use super::{write_atomic, CopyOutcome, SinkError};
use crate::core::metadata::MetadataSet;

/// Sorted property key/value table.
///
/// # Example
///
/// ```
/// use gitmeta::core::metadata::MetadataSet;
/// use gitmeta::sink::PropertyTable;
///
/// let mut set = MetadataSet::new();
/// set.insert("DIRTY", "false");
///
/// let mut table = PropertyTable::new();
/// table.merge(&set, &["git".to_string()]);
/// assert_eq!(table.get("git.dirty"), Some("false"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyTable {
    entries: BTreeMap<String, String>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the prefix fan-out of `set`. Existing keys are overwritten.
    pub fn merge(&mut self, set: &MetadataSet, prefixes: &[String]) {
        self.entries.extend(set.with_prefixes(prefixes));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render in `.properties` syntax, one `key=value` per line.
    ///
    /// Output is pure ASCII: characters outside printable ASCII are written
    /// as `\uXXXX` escapes.
    pub fn to_properties_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            escape_into(&mut out, key, true);
            out.push('=');
            escape_into(&mut out, value, false);
            out.push('\n');
        }
        out
    }

    /// Render as a pretty-printed JSON object.
    pub fn to_json(&self) -> Result<String, SinkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the `.properties` rendering to `path` atomically.
    pub fn write_to(&self, path: &Path) -> Result<CopyOutcome, SinkError> {
        write_atomic(path, self.to_properties_string().as_bytes())
    }
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    for (i, ch) in text.chars().enumerate() {
        match ch {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    // Writing to a String cannot fail
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
        }
    }
}
