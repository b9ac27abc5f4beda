//! core::config::schema
//!
//! Configuration schema types.
//!
//! Global and repository files share one schema, [`MetadataConfig`]. Every
//! field is optional; [`Config`](super::Config) accessors apply precedence
//! and defaults.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the date format must be a valid strftime
//! pattern, the encoding must be one gitmeta can write).

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::metadata::validate_date_format;
use crate::core::tags::{TagFilter, TagPreference};
use crate::sink::TextEncoding;

/// Configuration file contents (global or repo scope).
///
/// # Example
///
/// ```toml
/// date_format = "%Y-%m-%d %H:%M:%S"
/// dirty_flag = "-modified"
/// dirty_ignore_untracked = true
/// prefixes = ["gitmeta", "git"]
///
/// [describe]
/// always = true
/// tags = "annotated"
/// tag_preference = "name"
///
/// [info_source]
/// package = "my_crate::build"
/// class_name = "GitInfo"
/// output_dir = "target/generated"
/// encoding = "UTF-8"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// strftime pattern for TIMESTAMP and COMMIT_DATE
    pub date_format: Option<String>,

    /// Dirty suffix; `"null"` disables it
    pub dirty_flag: Option<String>,

    /// Whether untracked files are ignored when checking for changes
    pub dirty_ignore_untracked: Option<bool>,

    /// Property namespaces
    pub prefixes: Option<Vec<String>>,

    /// Describe settings
    pub describe: Option<DescribeConfig>,

    /// Info source generator settings
    pub info_source: Option<InfoSourceConfig>,
}

impl MetadataConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pattern) = &self.date_format {
            validate_date_format(pattern).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        if let Some(prefixes) = &self.prefixes {
            for prefix in prefixes {
                validate_prefix(prefix)?;
            }
        }

        if let Some(info) = &self.info_source {
            info.validate()?;
        }

        Ok(())
    }
}

/// Describe settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DescribeConfig {
    /// Fall back to the abbreviated id when no tag is reachable
    pub always: Option<bool>,

    /// Which tags take part ("all" or "annotated")
    pub tags: Option<TagFilter>,

    /// Tie-break among tags on one commit ("most-recent" or "name")
    pub tag_preference: Option<TagPreference>,
}

/// Info source generator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InfoSourceConfig {
    /// Module path of the generated source (`a::b` or `a.b`)
    pub package: Option<String>,

    /// Name of the generated type
    pub class_name: Option<String>,

    /// Template file; the built-in template when unset
    pub template: Option<PathBuf>,

    /// Root directory for generated sources
    pub output_dir: Option<PathBuf>,

    /// Output encoding
    pub encoding: Option<String>,
}

impl InfoSourceConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(package) = &self.package {
            validate_package(package)?;
        }

        if let Some(class_name) = &self.class_name {
            if !is_identifier(class_name) {
                return Err(ConfigError::InvalidValue(format!(
                    "class name '{}' is not an identifier",
                    class_name
                )));
            }
        }

        if let Some(encoding) = &self.encoding {
            TextEncoding::from_str(encoding).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        Ok(())
    }
}

/// Check a property namespace.
pub fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::InvalidValue(
            "prefix cannot be empty".to_string(),
        ));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidValue(format!(
            "prefix '{}' cannot contain whitespace",
            prefix
        )));
    }
    Ok(())
}

/// Check a module path: identifiers separated by `.` or `::`.
pub fn validate_package(package: &str) -> Result<(), ConfigError> {
    if package.is_empty() {
        return Ok(());
    }
    let normalized = package.replace("::", ".");
    if !normalized.split('.').all(is_identifier) {
        return Err(ConfigError::InvalidValue(format!(
            "package '{}' must be identifiers separated by '.' or '::'",
            package
        )));
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config: MetadataConfig = toml::from_str(
            r#"
            date_format = "%Y"
            dirty_flag = "null"
            prefixes = ["build"]

            [describe]
            always = true
            tags = "annotated"
            tag_preference = "name"

            [info_source]
            package = "app::meta"
            class_name = "GitInfo"
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        let describe = config.describe.unwrap();
        assert_eq!(describe.tags, Some(TagFilter::Annotated));
        assert_eq!(describe.tag_preference, Some(TagPreference::NameOrder));
    }

    #[test]
    fn rejects_bad_values() {
        let bad_prefix = MetadataConfig {
            prefixes: Some(vec!["has space".to_string()]),
            ..Default::default()
        };
        assert!(bad_prefix.validate().is_err());

        let bad_date = MetadataConfig {
            date_format: Some("%Q".to_string()),
            ..Default::default()
        };
        assert!(bad_date.validate().is_err());

        let bad_class = InfoSourceConfig {
            class_name: Some("1Info".to_string()),
            ..Default::default()
        };
        assert!(bad_class.validate().is_err());

        let bad_encoding = InfoSourceConfig {
            encoding: Some("EBCDIC".to_string()),
            ..Default::default()
        };
        assert!(bad_encoding.validate().is_err());
    }

    #[test]
    fn package_separators() {
        assert!(validate_package("com.example.app").is_ok());
        assert!(validate_package("app::build").is_ok());
        assert!(validate_package("").is_ok());
        assert!(validate_package("app..build").is_err());
        assert!(validate_package("app-build").is_err());
    }

    #[test]
    fn unknown_tag_preference_rejected() {
        let result: Result<MetadataConfig, _> = toml::from_str(
            r#"
            [describe]
            tag_preference = "newest"
            "#,
        );
        assert!(result.is_err());
    }
}
