//! engine::runner
//!
//! The single entry point for metadata collection.
//!
//! # Pipeline
//!
//! ```text
//! Scan -> Tag index -> Describe -> Assemble
//! ```
//!
//! Each stage's failure is wrapped in [`RunError`] naming the stage. Nothing
//! is retried and no partial metadata is returned.
//!
//! # Example
//!
//! ```
//! use gitmeta::core::metadata::BuildInfo;
//! use gitmeta::engine::{collect, Settings};
//! use gitmeta::git::MemoryRepository;
//!
//! let mut repo = MemoryRepository::linear(3);
//! let oids = repo.linear_oids_newest_first();
//! repo.add_tag("v1.0", &oids[2]);
//!
//! let set = collect(&repo, &Settings::default(), &BuildInfo::new("1.0.0")).unwrap();
//! assert!(set.get("DESCRIBE").unwrap().starts_with("v1.0-2-g"));
//! ```

use thiserror::Error;

use super::scan::scan;
use crate::core::config::Config;
use crate::core::describe::{describe, DescribeError, DescribeOptions};
use crate::core::metadata::{assemble, AssemblyConfig, AssemblyError, BuildInfo, MetadataSet};
use crate::core::tags::{TagFilter, TagIndex};
use crate::git::{GitError, RepositoryQuery};

/// Errors from the pipeline, by stage.
#[derive(Debug, Error)]
pub enum RunError {
    /// Reading the repository failed.
    #[error("repository query failed")]
    RepositoryQuery(#[from] GitError),

    /// Describe found no tag, or the walk could not read a commit.
    #[error("describe computation failed")]
    Describe(#[from] DescribeError),

    /// Formatting the metadata failed.
    #[error("metadata assembly failed")]
    Assembly(#[from] AssemblyError),
}

impl RunError {
    /// Check if this is the expected no-tag condition.
    pub fn is_no_tags(&self) -> bool {
        matches!(self, RunError::Describe(DescribeError::NoTagsFound { .. }))
    }
}

/// Effective settings for one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Date format and dirty suffix
    pub assembly: AssemblyConfig,
    /// Ignore untracked files when checking for changes
    pub ignore_untracked: bool,
    /// Fall back to the abbreviated id when no tag is reachable
    pub describe_always: bool,
    /// Which tags take part in describe
    pub tag_filter: TagFilter,
    /// Tie-break among tags on one commit
    pub describe: DescribeOptions,
}

impl Settings {
    /// Settings with configuration precedence applied. CLI flags are
    /// applied on top by the caller.
    pub fn from_config(config: &Config) -> Self {
        Self {
            assembly: AssemblyConfig {
                date_format: config.date_format(),
                dirty_flag: config.dirty_flag(),
            },
            ignore_untracked: config.dirty_ignore_untracked(),
            describe_always: config.describe_always(),
            tag_filter: config.tag_filter(),
            describe: DescribeOptions {
                preference: config.tag_preference(),
            },
        }
    }
}

/// Collect the metadata set for the repository's current state.
///
/// # Errors
///
/// - [`RunError::RepositoryQuery`] if the repository cannot be read
/// - [`RunError::Describe`] if no tag is reachable (unless
///   `describe_always` is set) or the walk fails
/// - [`RunError::Assembly`] if the date format is invalid
pub fn collect<R: RepositoryQuery>(
    repo: &R,
    settings: &Settings,
    build: &BuildInfo,
) -> Result<MetadataSet, RunError> {
    let snapshot = scan(repo, settings.ignore_untracked)?;
    let index = TagIndex::build_filtered(repo, settings.tag_filter)?;

    let described = match describe(repo, &snapshot.head, &index, &settings.describe) {
        Ok(result) => Some(result),
        Err(DescribeError::NoTagsFound { head }) if settings.describe_always => {
            tracing::info!(%head, "no reachable tag, describing by commit id");
            None
        }
        Err(e) => return Err(e.into()),
    };

    Ok(assemble(
        &snapshot,
        described.as_ref(),
        &settings.assembly,
        build,
    )?)
}
