//! sink::info_source
//!
//! Generates a source file that exposes the build metadata as constants.
//!
//! The generator adds two keys to the metadata set before rendering:
//! `CLASS_NAME` (the generated type) and `PACKAGE_NAME` (its module path).
//! The output lands at `<output_dir>/<package path>/<CLASS_NAME>.rs`, where
//! the package path splits the module path on `.` or `::`.

use std::path::PathBuf;

use super::template::{filter_copy, write_rendered};
use super::{CopyOutcome, SinkError, TextEncoding};
use crate::core::metadata::MetadataSet;

/// Template used when no template file is configured.
///
/// Values are substituted into ordinary string literals and are escaped
/// for Rust first (see [`InfoSource::generate`]).
pub const DEFAULT_TEMPLATE: &str = r###"// Generated by gitmeta. Do not edit.

/// Build metadata for `{PACKAGE_NAME}`.
pub struct {CLASS_NAME};

impl {CLASS_NAME} {
    pub const BRANCH: &'static str = "{BRANCH}";
    pub const COMMIT_ABBREV: &'static str = "{COMMIT_ABBREV}";
    pub const COMMIT_SHA: &'static str = "{COMMIT_SHA}";
    pub const COMMIT_AUTHOR_NAME: &'static str = "{COMMIT_AUTHOR_NAME}";
    pub const COMMIT_AUTHOR_EMAIL: &'static str = "{COMMIT_AUTHOR_EMAIL}";
    pub const COMMIT_DATE: &'static str = "{COMMIT_DATE}";
    pub const DESCRIBE: &'static str = "{DESCRIBE}";
    pub const DIRTY: bool = {DIRTY};
    pub const TAG_NAME: &'static str = "{TAG_NAME}";
    pub const TIMESTAMP: &'static str = "{TIMESTAMP}";
    pub const VERSION: &'static str = "{VERSION}";
}
"###;

/// Info source generator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSource {
    /// Module path, `.` or `::` separated; may be empty
    pub package: String,
    /// Name of the generated type
    pub class_name: String,
    /// Template file; [`DEFAULT_TEMPLATE`] when `None`
    pub template: Option<PathBuf>,
    /// Root directory for generated sources
    pub output_dir: PathBuf,
    pub encoding: TextEncoding,
}

impl InfoSource {
    /// Where the generated file goes.
    ///
    /// # Example
    ///
    /// ```
    /// use gitmeta::sink::InfoSource;
    /// use std::path::{Path, PathBuf};
    ///
    /// let info = InfoSource {
    ///     package: "com.example.app".to_string(),
    ///     class_name: "GitInfo".to_string(),
    ///     template: None,
    ///     output_dir: PathBuf::from("gen"),
    ///     encoding: Default::default(),
    /// };
    /// assert_eq!(info.target_path(), Path::new("gen/com/example/app/GitInfo.rs"));
    /// ```
    pub fn target_path(&self) -> PathBuf {
        let mut path = self.output_dir.clone();
        for segment in self.package.split("::").flat_map(|s| s.split('.')) {
            if !segment.is_empty() {
                path.push(segment);
            }
        }
        path.push(format!("{}.rs", self.class_name));
        path
    }

    /// `set` plus `CLASS_NAME` and `PACKAGE_NAME`.
    pub fn values(&self, set: &MetadataSet) -> MetadataSet {
        let mut values = set.clone();
        values.insert("CLASS_NAME", self.class_name.as_str());
        values.insert("PACKAGE_NAME", self.package.as_str());
        values
    }

    /// Render the template and write the source file.
    ///
    /// # Errors
    ///
    /// - [`SinkError::TemplateSource`] if the template file cannot be read
    /// - [`SinkError::Unencodable`] or [`SinkError::Write`] from the write
    pub fn generate(&self, set: &MetadataSet) -> Result<(PathBuf, CopyOutcome), SinkError> {
        let target = self.target_path();
        let values = self.values(set);

        let outcome = match &self.template {
            Some(path) => filter_copy(path, &target, &values, self.encoding)?,
            None => write_rendered(
                DEFAULT_TEMPLATE,
                &target,
                &escape_for_rust(&values),
                self.encoding,
            )?,
        };

        Ok((target, outcome))
    }
}

/// Escape every value so it can sit between `"` quotes in Rust source.
fn escape_for_rust(set: &MetadataSet) -> MetadataSet {
    let mut escaped = MetadataSet::new();
    for (key, value) in set.iter() {
        escaped.insert(key, value.escape_debug().to_string());
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn info(dir: &Path) -> InfoSource {
        InfoSource {
            package: "com.github.example".to_string(),
            class_name: "GitInfo".to_string(),
            template: None,
            output_dir: dir.to_path_buf(),
            encoding: TextEncoding::Utf8,
        }
    }

    fn set() -> MetadataSet {
        let mut set = MetadataSet::new();
        set.insert("BRANCH", "master");
        set.insert("DIRTY", "false");
        set
    }

    #[test]
    fn target_path_uses_package_segments() {
        let temp = TempDir::new().unwrap();
        let mut source = info(temp.path());
        assert_eq!(
            source.target_path(),
            temp.path().join("com/github/example/GitInfo.rs")
        );

        source.package = "app::build".to_string();
        assert_eq!(source.target_path(), temp.path().join("app/build/GitInfo.rs"));

        source.package = String::new();
        assert_eq!(source.target_path(), temp.path().join("GitInfo.rs"));
    }

    #[test]
    fn adds_class_and_package() {
        let temp = TempDir::new().unwrap();
        let values = info(temp.path()).values(&set());
        assert_eq!(values.get("CLASS_NAME"), Some("GitInfo"));
        assert_eq!(values.get("PACKAGE_NAME"), Some("com.github.example"));
        assert_eq!(values.get("BRANCH"), Some("master"));
    }

    #[test]
    fn default_template_renders() {
        let temp = TempDir::new().unwrap();
        let (path, outcome) = info(temp.path()).generate(&set()).unwrap();
        assert_eq!(outcome, CopyOutcome::Written);

        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("pub struct GitInfo;"));
        assert!(text.contains(r#"pub const BRANCH: &'static str = "master";"#));
        assert!(text.contains("pub const DIRTY: bool = false;"));
    }

    #[test]
    fn default_template_escapes_quotes_and_hashes() {
        let temp = TempDir::new().unwrap();
        let mut values = set();
        values.insert("BRANCH", "fix\"#1");
        values.insert("COMMIT_AUTHOR_NAME", "Bob \\ \"B\"");

        let (path, _) = info(temp.path()).generate(&values).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains(r##"pub const BRANCH: &'static str = "fix\"#1";"##));
        assert!(text.contains(
            r##"pub const COMMIT_AUTHOR_NAME: &'static str = "Bob \\ \"B\"";"##
        ));
    }

    #[test]
    fn custom_template_gets_raw_values() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("info.tpl");
        fs::write(&template, "{BRANCH}").unwrap();

        let mut values = set();
        values.insert("BRANCH", "fix\"#1");
        let mut source = info(&temp.path().join("out"));
        source.template = Some(template);
        let (path, _) = source.generate(&values).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "fix\"#1");
    }

    #[test]
    fn custom_template() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("info.tpl");
        fs::write(&template, "{PACKAGE_NAME}::{CLASS_NAME} on {BRANCH}").unwrap();

        let mut source = info(&temp.path().join("out"));
        source.template = Some(template);
        let (path, _) = source.generate(&set()).unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "com.github.example::GitInfo on master"
        );
    }

    #[test]
    fn missing_template_fails() {
        let temp = TempDir::new().unwrap();
        let mut source = info(temp.path());
        source.template = Some(temp.path().join("nope.tpl"));

        assert!(matches!(
            source.generate(&set()),
            Err(SinkError::TemplateSource { .. })
        ));
    }
}
