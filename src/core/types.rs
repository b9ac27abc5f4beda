//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`BranchName`] - Validated Git branch name
//! - [`TagName`] - Validated Git tag name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so the describe engine and the assembler never
//! have to re-check what the git layer handed them.
//!
//! # Examples
//!
//! ```
//! use gitmeta::core::types::{BranchName, Oid, TagName};
//!
//! let branch = BranchName::new("feature/my-branch").unwrap();
//! let tag = TagName::new("v1.2.3").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short(7), "abc123d");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(TagName::new("v1 final").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// Check a short ref name (the part after `refs/heads/` or `refs/tags/`)
/// against Git's refname rules (see `git check-ref-format`).
///
/// Returns a description of the first violated rule.
fn check_ref_format(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }
    if name == "@" {
        return Err("name cannot be '@' (reserved)".into());
    }
    if name.starts_with('-') {
        return Err("name cannot start with '-'".into());
    }
    if name.ends_with('/') {
        return Err("name cannot end with '/'".into());
    }
    if name.ends_with('.') {
        return Err("name cannot end with '.'".into());
    }

    for pattern in ["..", "@{", "//"] {
        if name.contains(pattern) {
            return Err(format!("name cannot contain '{pattern}'"));
        }
    }

    const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
    if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(format!("name cannot contain '{c}'"));
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Err("name cannot contain control characters".into());
    }

    for component in name.split('/') {
        if component.starts_with('.') {
            return Err("path component cannot start with '.'".into());
        }
        if component.ends_with(".lock") {
            return Err("path component cannot end with '.lock'".into());
        }
    }

    Ok(())
}

/// A validated Git branch name.
///
/// # Example
///
/// ```
/// use gitmeta::core::types::BranchName;
///
/// let name = BranchName::new("release/2.x").unwrap();
/// assert_eq!(name.as_str(), "release/2.x");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new(".hidden").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        check_ref_format(&name).map_err(TypeError::InvalidBranchName)?;
        Ok(Self(name))
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated Git tag name (without the `refs/tags/` prefix).
///
/// Ordering is plain byte-wise string ordering, which is what the
/// name-based tag preference uses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Create a new validated tag name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTagName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        check_ref_format(&name).map_err(TypeError::InvalidTagName)?;
        Ok(Self(name))
    }

    /// Strip `refs/tags/` from a full ref name and validate the rest.
    ///
    /// Returns `None` for refs outside the tag namespace.
    pub fn from_ref(refname: &str) -> Option<Result<Self, TypeError>> {
        refname.strip_prefix("refs/tags/").map(Self::new)
    }

    /// Get the tag name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use gitmeta::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_impls {
    ($($ty:ident),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = TypeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    )*};
}

string_newtype_impls!(BranchName, TagName, Oid);
