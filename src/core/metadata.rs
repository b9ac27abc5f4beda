//! core::metadata
//!
//! Metadata assembly: turns a repository snapshot and an optional describe
//! result into the flat key/value set every sink consumes.
//!
//! # Keys
//!
//! | Key | Value |
//! |---|---|
//! | `BRANCH` | checked-out branch, empty when detached |
//! | `COMMIT_ABBREV` | abbreviated HEAD id, plus dirty suffix |
//! | `COMMIT_SHA` | full HEAD id, plus dirty suffix |
//! | `COMMIT_AUTHOR_NAME` | HEAD author name |
//! | `COMMIT_AUTHOR_EMAIL` | HEAD author email |
//! | `COMMIT_DATE` | HEAD committer time, formatted |
//! | `DESCRIBE` | descriptor (or abbreviated id), plus dirty suffix |
//! | `DIRTY` | `true` or `false` |
//! | `TAG_NAME` | nearest tag, empty without one |
//! | `TIMESTAMP` | assembly time, formatted |
//! | `VERSION` | build version, passed through |
//!
//! Callers may append further keys (the info-source generator adds
//! `CLASS_NAME` and `PACKAGE_NAME`).
//!
//! # Prefix fan-out
//!
//! Property sinks publish every key once per prefix namespace as
//! `{prefix}.{dotted}`, where `dotted` is the key lowercased with `_`
//! replaced by `.`: `COMMIT_ABBREV` under `git` becomes `git.commit.abbrev`.

use std::fmt::{self, Write as _};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::describe::DescribeResult;
use super::graph::Commit;
use super::types::BranchName;

/// Default pattern for `TIMESTAMP` and `COMMIT_DATE`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Default dirty suffix.
pub const DEFAULT_DIRTY_FLAG: &str = "-dirty";

/// Errors from metadata assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("invalid date format '{pattern}'")]
    InvalidDateFormat { pattern: String },
}

/// Suffix policy for dirty working trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirtyFlag {
    /// Append this string to `COMMIT_ABBREV`, `COMMIT_SHA` and `DESCRIBE`.
    Suffix(String),
    /// Never append anything. `DIRTY` is still reported.
    Disabled,
}

impl DirtyFlag {
    /// Configuration value that disables the suffix.
    pub const DISABLED_SENTINEL: &'static str = "null";

    /// Interpret a configured flag, honouring [`Self::DISABLED_SENTINEL`].
    ///
    /// # Example
    ///
    /// ```
    /// use gitmeta::core::metadata::DirtyFlag;
    ///
    /// assert_eq!(DirtyFlag::from_setting("-modified"), DirtyFlag::Suffix("-modified".into()));
    /// assert_eq!(DirtyFlag::from_setting("null"), DirtyFlag::Disabled);
    /// ```
    pub fn from_setting(value: &str) -> Self {
        if value == Self::DISABLED_SENTINEL {
            DirtyFlag::Disabled
        } else {
            DirtyFlag::Suffix(value.to_string())
        }
    }

    /// The suffix to append, if any.
    pub fn suffix(&self) -> Option<&str> {
        match self {
            DirtyFlag::Suffix(s) => Some(s),
            DirtyFlag::Disabled => None,
        }
    }
}

impl Default for DirtyFlag {
    fn default() -> Self {
        DirtyFlag::Suffix(DEFAULT_DIRTY_FLAG.to_string())
    }
}

/// Formatting knobs for [`assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyConfig {
    /// chrono strftime pattern for `TIMESTAMP` and `COMMIT_DATE`
    pub date_format: String,
    /// Dirty suffix policy
    pub dirty_flag: DirtyFlag,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            dirty_flag: DirtyFlag::default(),
        }
    }
}

/// Facts about the build that do not come from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Project version, passed through as `VERSION`
    pub version: String,
    /// When the invocation started; `TIMESTAMP` is never earlier
    pub started_at: DateTime<Utc>,
}

impl BuildInfo {
    /// Build info for `version`, started now.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            started_at: Utc::now(),
        }
    }
}

/// Everything read from the repository for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    /// The HEAD commit
    pub head: Commit,
    /// Abbreviated HEAD id
    pub head_abbrev: String,
    /// Checked-out branch, `None` when detached
    pub branch: Option<BranchName>,
    /// Whether the working tree counts as dirty
    pub dirty: bool,
}

/// The standard metadata keys, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    Branch,
    CommitAbbrev,
    CommitSha,
    CommitAuthorName,
    CommitAuthorEmail,
    CommitDate,
    Describe,
    Dirty,
    TagName,
    Timestamp,
    Version,
}

impl MetadataKey {
    /// All standard keys in emission order.
    pub const ALL: [MetadataKey; 11] = [
        MetadataKey::Branch,
        MetadataKey::CommitAbbrev,
        MetadataKey::CommitSha,
        MetadataKey::CommitAuthorName,
        MetadataKey::CommitAuthorEmail,
        MetadataKey::CommitDate,
        MetadataKey::Describe,
        MetadataKey::Dirty,
        MetadataKey::TagName,
        MetadataKey::Timestamp,
        MetadataKey::Version,
    ];

    /// The upper-case key name.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::Branch => "BRANCH",
            MetadataKey::CommitAbbrev => "COMMIT_ABBREV",
            MetadataKey::CommitSha => "COMMIT_SHA",
            MetadataKey::CommitAuthorName => "COMMIT_AUTHOR_NAME",
            MetadataKey::CommitAuthorEmail => "COMMIT_AUTHOR_EMAIL",
            MetadataKey::CommitDate => "COMMIT_DATE",
            MetadataKey::Describe => "DESCRIBE",
            MetadataKey::Dirty => "DIRTY",
            MetadataKey::TagName => "TAG_NAME",
            MetadataKey::Timestamp => "TIMESTAMP",
            MetadataKey::Version => "VERSION",
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property key for `key` under `prefix`.
///
/// # Example
///
/// ```
/// use gitmeta::core::metadata::property_key;
///
/// assert_eq!(property_key("git", "COMMIT_ABBREV"), "git.commit.abbrev");
/// ```
pub fn property_key(prefix: &str, key: &str) -> String {
    format!("{}.{}", prefix, key.to_lowercase().replace('_', "."))
}

/// Ordered key/value metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSet {
    entries: Vec<(String, String)>,
}

impl MetadataSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing its value in place or appending it.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value by key name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a standard key.
    pub fn value(&self, key: MetadataKey) -> Option<&str> {
        self.get(key.as_str())
    }

    /// Entries in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One entry per key per prefix, prefixes outermost.
    pub fn with_prefixes(&self, prefixes: &[String]) -> Vec<(String, String)> {
        prefixes
            .iter()
            .flat_map(|prefix| {
                self.iter()
                    .map(move |(k, v)| (property_key(prefix, k), v.to_string()))
            })
            .collect()
    }
}

/// Check a strftime pattern without formatting anything.
pub fn validate_date_format(pattern: &str) -> Result<(), AssemblyError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(AssemblyError::InvalidDateFormat {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

fn format_time(time: DateTime<Utc>, pattern: &str) -> Result<String, AssemblyError> {
    validate_date_format(pattern)?;

    let mut out = String::new();
    write!(out, "{}", time.format(pattern)).map_err(|_| AssemblyError::InvalidDateFormat {
        pattern: pattern.to_string(),
    })?;
    Ok(out)
}

/// Assemble the metadata set for one invocation.
///
/// With no describe result, `DESCRIBE` falls back to the abbreviated id and
/// `TAG_NAME` is empty.
///
/// # Errors
///
/// - [`AssemblyError::InvalidDateFormat`] if `config.date_format` does not
///   parse; nothing partial is returned
pub fn assemble(
    snapshot: &RepositorySnapshot,
    describe: Option<&DescribeResult>,
    config: &AssemblyConfig,
    build: &BuildInfo,
) -> Result<MetadataSet, AssemblyError> {
    let commit_date = format_time(snapshot.head.commit_time, &config.date_format)?;
    let timestamp = format_time(Utc::now().max(build.started_at), &config.date_format)?;

    let suffix = match (&config.dirty_flag, snapshot.dirty) {
        (DirtyFlag::Suffix(s), true) => s.as_str(),
        _ => "",
    };

    let (descriptor, tag_name) = match describe {
        Some(result) => (result.descriptor(), result.tag.to_string()),
        None => (snapshot.head_abbrev.clone(), String::new()),
    };

    let mut set = MetadataSet::new();
    for key in MetadataKey::ALL {
        let value = match key {
            MetadataKey::Branch => snapshot
                .branch
                .as_ref()
                .map(|b| b.to_string())
                .unwrap_or_default(),
            MetadataKey::CommitAbbrev => format!("{}{suffix}", snapshot.head_abbrev),
            MetadataKey::CommitSha => format!("{}{suffix}", snapshot.head.oid),
            MetadataKey::CommitAuthorName => snapshot.head.author_name.clone(),
            MetadataKey::CommitAuthorEmail => snapshot.head.author_email.clone(),
            MetadataKey::CommitDate => commit_date.clone(),
            MetadataKey::Describe => format!("{descriptor}{suffix}"),
            MetadataKey::Dirty => snapshot.dirty.to_string(),
            MetadataKey::TagName => tag_name.clone(),
            MetadataKey::Timestamp => timestamp.clone(),
            MetadataKey::Version => build.version.clone(),
        };
        set.insert(key.as_str(), value);
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Oid, TagName};
    use chrono::TimeZone;

    fn snapshot(dirty: bool) -> RepositorySnapshot {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        RepositorySnapshot {
            head: Commit {
                oid: Oid::new("deadbeef".repeat(5)).unwrap(),
                parents: Vec::new(),
                author_name: "Ada".to_string(),
                author_email: "ada@example.com".to_string(),
                author_time: when,
                commit_time: when,
                message: "release\n".to_string(),
            },
            head_abbrev: "deadbeef".to_string(),
            branch: Some(BranchName::new("master").unwrap()),
            dirty,
        }
    }

    fn described() -> DescribeResult {
        DescribeResult {
            tag: TagName::new("v1.2.3").unwrap(),
            distance: 4,
            abbrev: "deadbeef".to_string(),
        }
    }

    fn build() -> BuildInfo {
        BuildInfo::new("1.2.3")
    }

    mod dirty_flag {
        use super::*;

        #[test]
        fn sentinel_disables() {
            assert_eq!(DirtyFlag::from_setting("null"), DirtyFlag::Disabled);
            assert_eq!(DirtyFlag::Disabled.suffix(), None);
        }

        #[test]
        fn default_is_dirty_suffix() {
            assert_eq!(DirtyFlag::default().suffix(), Some("-dirty"));
        }
    }

    mod assemble {
        use super::*;

        #[test]
        fn keys_in_emission_order() {
            let set = assemble(&snapshot(false), Some(&described()), &AssemblyConfig::default(), &build())
                .unwrap();
            let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
            let expected: Vec<_> = MetadataKey::ALL.iter().map(|k| k.as_str()).collect();
            assert_eq!(keys, expected);
        }

        #[test]
        fn clean_values() {
            let set = assemble(&snapshot(false), Some(&described()), &AssemblyConfig::default(), &build())
                .unwrap();
            assert_eq!(set.value(MetadataKey::Branch), Some("master"));
            assert_eq!(set.value(MetadataKey::CommitAbbrev), Some("deadbeef"));
            assert_eq!(set.value(MetadataKey::Describe), Some("v1.2.3-4-gdeadbeef"));
            assert_eq!(set.value(MetadataKey::Dirty), Some("false"));
            assert_eq!(set.value(MetadataKey::TagName), Some("v1.2.3"));
            assert_eq!(set.value(MetadataKey::Version), Some("1.2.3"));
            assert_eq!(set.value(MetadataKey::CommitDate), Some("2024-03-01T12:30:00+00:00"));
        }

        #[test]
        fn dirty_suffix_skips_tag_name() {
            let set = assemble(&snapshot(true), Some(&described()), &AssemblyConfig::default(), &build())
                .unwrap();
            assert_eq!(set.value(MetadataKey::CommitAbbrev), Some("deadbeef-dirty"));
            assert!(set.value(MetadataKey::CommitSha).unwrap().ends_with("-dirty"));
            assert_eq!(set.value(MetadataKey::Describe), Some("v1.2.3-4-gdeadbeef-dirty"));
            assert_eq!(set.value(MetadataKey::TagName), Some("v1.2.3"));
            assert_eq!(set.value(MetadataKey::Dirty), Some("true"));
        }

        #[test]
        fn disabled_flag_still_reports_dirty() {
            let config = AssemblyConfig {
                dirty_flag: DirtyFlag::Disabled,
                ..Default::default()
            };
            let set = assemble(&snapshot(true), Some(&described()), &config, &build()).unwrap();
            assert_eq!(set.value(MetadataKey::CommitAbbrev), Some("deadbeef"));
            assert_eq!(set.value(MetadataKey::Dirty), Some("true"));
        }

        #[test]
        fn no_describe_falls_back_to_abbrev() {
            let set = assemble(&snapshot(false), None, &AssemblyConfig::default(), &build()).unwrap();
            assert_eq!(set.value(MetadataKey::Describe), Some("deadbeef"));
            assert_eq!(set.value(MetadataKey::TagName), Some(""));
        }

        #[test]
        fn detached_head_has_empty_branch() {
            let mut snap = snapshot(false);
            snap.branch = None;
            let set = assemble(&snap, None, &AssemblyConfig::default(), &build()).unwrap();
            assert_eq!(set.value(MetadataKey::Branch), Some(""));
        }

        #[test]
        fn invalid_date_format_fails() {
            let config = AssemblyConfig {
                date_format: "%Q-%".to_string(),
                ..Default::default()
            };
            let err = assemble(&snapshot(false), None, &config, &build()).unwrap_err();
            assert!(matches!(err, AssemblyError::InvalidDateFormat { .. }));
        }

        #[test]
        fn timestamp_not_before_start() {
            let config = AssemblyConfig {
                date_format: "%s".to_string(),
                ..Default::default()
            };
            let info = build();
            let set = assemble(&snapshot(false), None, &config, &info).unwrap();
            let stamp: i64 = set.value(MetadataKey::Timestamp).unwrap().parse().unwrap();
            assert!(stamp >= info.started_at.timestamp());
        }

        #[test]
        fn repeated_assembly_differs_only_in_timestamp() {
            let config = AssemblyConfig {
                date_format: "%s%.9f".to_string(),
                ..Default::default()
            };
            let first = assemble(&snapshot(true), Some(&described()), &config, &build()).unwrap();
            let second = assemble(&snapshot(true), Some(&described()), &config, &build()).unwrap();
            for ((k1, v1), (k2, v2)) in first.iter().zip(second.iter()) {
                assert_eq!(k1, k2);
                if k1 != "TIMESTAMP" {
                    assert_eq!(v1, v2);
                }
            }

            let stamp = |set: &MetadataSet| -> f64 {
                set.value(MetadataKey::Timestamp).unwrap().parse().unwrap()
            };
            assert!(stamp(&second) >= stamp(&first));
        }
    }

    mod metadata_set {
        use super::*;

        #[test]
        fn insert_replaces_in_place() {
            let mut set = MetadataSet::new();
            set.insert("A", "1");
            set.insert("B", "2");
            set.insert("A", "3");
            let entries: Vec<_> = set.iter().collect();
            assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
        }

        #[test]
        fn prefixes_fan_out() {
            let mut set = MetadataSet::new();
            set.insert("COMMIT_ABBREV", "deadbeef");
            set.insert("DIRTY", "false");
            let prefixes = vec!["gitmeta".to_string(), "git".to_string()];
            let fanned = set.with_prefixes(&prefixes);
            assert_eq!(
                fanned,
                vec![
                    ("gitmeta.commit.abbrev".to_string(), "deadbeef".to_string()),
                    ("gitmeta.dirty".to_string(), "false".to_string()),
                    ("git.commit.abbrev".to_string(), "deadbeef".to_string()),
                    ("git.dirty".to_string(), "false".to_string()),
                ]
            );
        }

        #[test]
        fn no_prefixes_no_entries() {
            let mut set = MetadataSet::new();
            set.insert("DIRTY", "false");
            assert!(set.with_prefixes(&[]).is_empty());
        }
    }
}
