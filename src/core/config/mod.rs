//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! gitmeta has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (applied by the engine settings, not here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GITMETA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitmeta/config.toml`
//! 3. `~/.gitmeta/config.toml`
//!
//! # Repo Config Locations
//!
//! Searched in order:
//! 1. `.gitmeta.toml` in the working directory root
//! 2. `.git/gitmeta/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use gitmeta::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! let config = result.config;
//!
//! println!("Prefixes: {:?}", config.prefixes());
//! println!("Date format: {}", config.date_format());
//! ```

pub mod schema;

pub use schema::{DescribeConfig, InfoSourceConfig, MetadataConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::metadata::{DirtyFlag, DEFAULT_DATE_FORMAT, DEFAULT_DIRTY_FLAG};
use crate::core::tags::{TagFilter, TagPreference};

/// Default property namespaces.
pub const DEFAULT_PREFIXES: [&str; 2] = ["gitmeta", "git"];

/// Default name of the generated info type.
pub const DEFAULT_CLASS_NAME: &str = "GitInfo";

/// Default module path of the generated info source.
pub const DEFAULT_PACKAGE: &str = "gitmeta";

/// Default root for generated sources.
pub const DEFAULT_OUTPUT_DIR: &str = "target/generated-sources/gitmeta";

/// Default output encoding.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. Repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: MetadataConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<MetadataConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

/// Where global configuration may live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalLocations {
    /// `$GITMETA_CONFIG`
    pub explicit: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME`
    pub xdg_config_home: Option<PathBuf>,
    /// The user's home directory
    pub home: Option<PathBuf>,
}

impl GlobalLocations {
    /// Locations taken from the environment.
    pub fn from_env() -> Self {
        Self {
            explicit: std::env::var_os("GITMETA_CONFIG").map(PathBuf::from),
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            home: dirs::home_dir(),
        }
    }

    /// Candidate files in lookup order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = &self.explicit {
            paths.push(path.clone());
        }
        if let Some(xdg) = &self.xdg_config_home {
            paths.push(xdg.join("gitmeta/config.toml"));
        }
        if let Some(home) = &self.home {
            paths.push(home.join(".gitmeta/config.toml"));
        }
        paths
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_path` (a working directory root) is provided, also loads
    /// repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// hold invalid values. Missing config files are not an error
    /// (defaults are used).
    pub fn load(repo_path: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(repo_path, &GlobalLocations::from_env())
    }

    /// Like [`load`](Self::load), with explicit global locations.
    pub fn load_from(
        repo_path: Option<&Path>,
        locations: &GlobalLocations,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = Self::load_global(locations)?;

        let (repo, repo_path_found) = if let Some(path) = repo_path {
            Self::load_repo(path, &mut warnings)?
        } else {
            (None, None)
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path,
                repo_path: repo_path_found,
            },
            warnings,
        })
    }

    /// Load global configuration from the first existing candidate.
    fn load_global(
        locations: &GlobalLocations,
    ) -> Result<(MetadataConfig, Option<PathBuf>), ConfigError> {
        for path in locations.candidates() {
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }
        Ok((MetadataConfig::default(), None))
    }

    /// Load repository configuration from standard locations.
    fn load_repo(
        repo_path: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<MetadataConfig>, Option<PathBuf>), ConfigError> {
        let in_tree = Self::repo_config_path(repo_path);
        let in_git_dir = repo_path.join(".git/gitmeta/config.toml");

        // 1. Check .gitmeta.toml
        if in_tree.exists() {
            if in_git_dir.exists() {
                warnings.push(ConfigWarning {
                    message: format!(
                        "Ignoring config shadowed by '{}'",
                        in_tree.display()
                    ),
                    path: in_git_dir,
                });
            }
            let config = Self::read_config(&in_tree)?;
            return Ok((Some(config), Some(in_tree)));
        }

        // 2. Check .git/gitmeta/config.toml
        if in_git_dir.exists() {
            let config = Self::read_config(&in_git_dir)?;
            return Ok((Some(config), Some(in_git_dir)));
        }

        Ok((None, None))
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<MetadataConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for repo config.
    ///
    /// Returns `.gitmeta.toml` relative to the given working directory.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".gitmeta.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// First value set by the repo file, then the global file.
    fn pick<T>(&self, get: impl Fn(&MetadataConfig) -> Option<T>) -> Option<T> {
        self.repo.as_ref().and_then(&get).or_else(|| get(&self.global))
    }

    /// Get the date format.
    ///
    /// Defaults to ISO 8601 with offset.
    pub fn date_format(&self) -> String {
        self.pick(|c| c.date_format.clone())
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string())
    }

    /// Get the dirty suffix policy.
    ///
    /// Defaults to `-dirty`.
    pub fn dirty_flag(&self) -> DirtyFlag {
        let raw = self
            .pick(|c| c.dirty_flag.clone())
            .unwrap_or_else(|| DEFAULT_DIRTY_FLAG.to_string());
        DirtyFlag::from_setting(&raw)
    }

    /// Check if untracked files are ignored for dirty detection.
    ///
    /// Defaults to `false`.
    pub fn dirty_ignore_untracked(&self) -> bool {
        self.pick(|c| c.dirty_ignore_untracked).unwrap_or(false)
    }

    /// Get the property namespaces.
    ///
    /// Defaults to `["gitmeta", "git"]`.
    pub fn prefixes(&self) -> Vec<String> {
        self.pick(|c| c.prefixes.clone())
            .unwrap_or_else(|| DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect())
    }

    /// Check if describe falls back to the abbreviated id.
    ///
    /// Defaults to `false`.
    pub fn describe_always(&self) -> bool {
        self.pick(|c| c.describe.as_ref().and_then(|d| d.always))
            .unwrap_or(false)
    }

    /// Get the tag filter.
    pub fn tag_filter(&self) -> TagFilter {
        self.pick(|c| c.describe.as_ref().and_then(|d| d.tags))
            .unwrap_or_default()
    }

    /// Get the tag tie-break policy.
    pub fn tag_preference(&self) -> TagPreference {
        self.pick(|c| c.describe.as_ref().and_then(|d| d.tag_preference))
            .unwrap_or_default()
    }

    /// Get the info source package.
    pub fn info_package(&self) -> String {
        self.pick(|c| info_section(c).and_then(|i| i.package.clone()))
            .unwrap_or_else(|| DEFAULT_PACKAGE.to_string())
    }

    /// Get the info source type name.
    pub fn info_class_name(&self) -> String {
        self.pick(|c| info_section(c).and_then(|i| i.class_name.clone()))
            .unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string())
    }

    /// Get the info source template, if one is configured.
    pub fn info_template(&self) -> Option<PathBuf> {
        self.pick(|c| info_section(c).and_then(|i| i.template.clone()))
    }

    /// Get the info source output directory.
    pub fn info_output_dir(&self) -> PathBuf {
        self.pick(|c| info_section(c).and_then(|i| i.output_dir.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Get the info source encoding name.
    pub fn info_encoding(&self) -> String {
        self.pick(|c| info_section(c).and_then(|i| i.encoding.clone()))
            .unwrap_or_else(|| DEFAULT_ENCODING.to_string())
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

fn info_section(config: &MetadataConfig) -> Option<&InfoSourceConfig> {
    config.info_source.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let config = Config::default();

        assert_eq!(config.date_format(), DEFAULT_DATE_FORMAT);
        assert_eq!(config.dirty_flag(), DirtyFlag::Suffix("-dirty".to_string()));
        assert!(!config.dirty_ignore_untracked());
        assert_eq!(config.prefixes(), vec!["gitmeta", "git"]);
        assert!(!config.describe_always());
        assert_eq!(config.tag_filter(), TagFilter::All);
        assert_eq!(config.tag_preference(), TagPreference::MostRecent);
        assert_eq!(config.info_class_name(), "GitInfo");
        assert_eq!(config.info_encoding(), "UTF-8");
        assert!(config.info_template().is_none());
    }

    #[test]
    fn load_global_from_explicit_path() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        fs::write(
            &config_path,
            r#"
            dirty_flag = "null"
            dirty_ignore_untracked = true
            "#,
        )
        .unwrap();

        let locations = GlobalLocations {
            explicit: Some(config_path.clone()),
            ..Default::default()
        };
        let config = Config::load_from(None, &locations).unwrap().config;
        assert_eq!(config.dirty_flag(), DirtyFlag::Disabled);
        assert!(config.dirty_ignore_untracked());
        assert_eq!(config.global_config_loaded_from(), Some(config_path.as_path()));
    }

    #[test]
    fn global_lookup_order() {
        let temp = TempDir::new().unwrap();
        let xdg = temp.path().join("xdg");
        let home = temp.path().join("home");
        fs::create_dir_all(xdg.join("gitmeta")).unwrap();
        fs::create_dir_all(home.join(".gitmeta")).unwrap();
        fs::write(xdg.join("gitmeta/config.toml"), "date_format = \"%Y\"").unwrap();
        fs::write(home.join(".gitmeta/config.toml"), "date_format = \"%m\"").unwrap();

        let locations = GlobalLocations {
            explicit: Some(temp.path().join("missing.toml")),
            xdg_config_home: Some(xdg.clone()),
            home: Some(home.clone()),
        };
        let config = Config::load_from(None, &locations).unwrap().config;
        assert_eq!(config.date_format(), "%Y");
        assert_eq!(
            config.global_config_loaded_from(),
            Some(xdg.join("gitmeta/config.toml").as_path())
        );

        let home_only = GlobalLocations {
            home: Some(home),
            ..Default::default()
        };
        let config = Config::load_from(None, &home_only).unwrap().config;
        assert_eq!(config.date_format(), "%m");
    }

    #[test]
    fn load_repo_config_from_tree() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".gitmeta.toml"),
            r#"
            prefixes = ["build"]

            [describe]
            always = true
            "#,
        )
        .unwrap();

        let result = Config::load_from(Some(temp.path()), &GlobalLocations::default()).unwrap();
        let config = result.config;

        assert_eq!(config.prefixes(), vec!["build"]);
        assert!(config.describe_always());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn load_repo_config_from_git_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".git/gitmeta");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "date_format = \"%Y\"").unwrap();

        let config = Config::load_from(Some(temp.path()), &GlobalLocations::default()).unwrap().config;
        assert_eq!(config.date_format(), "%Y");
    }

    #[test]
    fn shadowed_repo_config_warns() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".git/gitmeta");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "date_format = \"%Y\"").unwrap();
        fs::write(temp.path().join(".gitmeta.toml"), "date_format = \"%m\"").unwrap();

        let result = Config::load_from(Some(temp.path()), &GlobalLocations::default()).unwrap();
        assert_eq!(result.config.date_format(), "%m");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("shadowed"));
    }

    #[test]
    fn invalid_date_format_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitmeta.toml"), "date_format = \"%Q\"").unwrap();

        let result = Config::load_from(Some(temp.path()), &GlobalLocations::default());
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".gitmeta.toml"),
            r#"
            date_format = "%Y"
            unknown_field = true
            "#,
        )
        .unwrap();

        let result = Config::load_from(Some(temp.path()), &GlobalLocations::default());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn precedence_repo_overrides_global() {
        let config = Config {
            global: MetadataConfig {
                date_format: Some("%Y".to_string()),
                dirty_flag: Some("-changed".to_string()),
                ..Default::default()
            },
            repo: Some(MetadataConfig {
                date_format: Some("%m".to_string()),
                ..Default::default()
            }),
            global_path: None,
            repo_path: None,
        };

        assert_eq!(config.date_format(), "%m");
        assert_eq!(config.dirty_flag(), DirtyFlag::Suffix("-changed".to_string()));
    }
}
