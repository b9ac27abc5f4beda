//! core::describe
//!
//! Names a commit relative to its nearest reachable tag, the way
//! `git describe --tags` does.
//!
//! # Algorithm
//!
//! Starting at HEAD, commits are pulled from a fresh
//! [`AncestorWalk`](crate::core::graph::AncestorWalk), newest committer
//! timestamp first, following every parent. The n-th commit yielded
//! (counting from zero) sits at distance n. The first yielded commit that
//! carries a tag ends the walk; its preferred tag (per [`TagPreference`])
//! becomes the result. If the walk runs dry, there is no tag to describe
//! against and [`DescribeError::NoTagsFound`] is returned.
//!
//! # Output
//!
//! - distance 0: the tag name, unchanged
//! - otherwise: `{tag}-{distance}-g{abbrev}`
//!
//! The dirty suffix is not applied here. The metadata assembler owns that
//! policy, which keeps this module a pure function of the commit graph.

use std::fmt;

use thiserror::Error;

use super::graph::Commit;
use super::tags::{TagIndex, TagPreference};
use super::types::{Oid, TagName};
use crate::git::{GitError, RepositoryQuery};

/// Errors from describe.
#[derive(Debug, Error)]
pub enum DescribeError {
    /// No tag is reachable from HEAD.
    ///
    /// Expected for fresh repositories; callers may fall back to the
    /// abbreviated commit id.
    #[error("no tags can describe {head}")]
    NoTagsFound {
        /// The commit that was being described
        head: Oid,
    },

    /// Reading the commit graph failed mid-walk.
    #[error(transparent)]
    Repository(#[from] GitError),
}

/// Knobs for a describe call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescribeOptions {
    /// How to choose among several tags on the winning commit.
    pub preference: TagPreference,
}

/// Outcome of describing a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeResult {
    /// The nearest tag
    pub tag: TagName,
    /// Commits visited before reaching the tagged commit
    pub distance: usize,
    /// Abbreviated id of the described commit
    pub abbrev: String,
}

impl DescribeResult {
    /// The human-readable descriptor, without any dirty suffix.
    ///
    /// # Example
    ///
    /// ```
    /// use gitmeta::core::describe::DescribeResult;
    /// use gitmeta::core::types::TagName;
    ///
    /// let exact = DescribeResult {
    ///     tag: TagName::new("v1.2.3").unwrap(),
    ///     distance: 0,
    ///     abbrev: "deadbee".to_string(),
    /// };
    /// assert_eq!(exact.descriptor(), "v1.2.3");
    ///
    /// let ahead = DescribeResult { distance: 4, ..exact };
    /// assert_eq!(ahead.descriptor(), "v1.2.3-4-gdeadbee");
    /// ```
    pub fn descriptor(&self) -> String {
        self.to_string()
    }

    /// Whether the described commit carries the tag itself.
    pub fn is_exact(&self) -> bool {
        self.distance == 0
    }
}

impl fmt::Display for DescribeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.distance == 0 {
            write!(f, "{}", self.tag)
        } else {
            write!(f, "{}-{}-g{}", self.tag, self.distance, self.abbrev)
        }
    }
}

/// Describe `head` against the tags in `index`.
///
/// # Errors
///
/// - [`DescribeError::NoTagsFound`] if no tagged commit is reachable
/// - [`DescribeError::Repository`] if a commit cannot be read
pub fn describe<R: RepositoryQuery>(
    repo: &R,
    head: &Commit,
    index: &TagIndex,
    options: &DescribeOptions,
) -> Result<DescribeResult, DescribeError> {
    if index.is_empty() {
        return Err(DescribeError::NoTagsFound {
            head: head.oid.clone(),
        });
    }

    for (distance, commit) in repo.walk_ancestors(head).enumerate() {
        let commit = commit?;
        let Some(tag) = index.best_for(&commit.oid, options.preference) else {
            continue;
        };

        tracing::debug!(
            tag = %tag.name,
            distance,
            tagged = %commit.oid,
            "found nearest tag"
        );
        return Ok(DescribeResult {
            tag: tag.name.clone(),
            distance,
            abbrev: repo.abbreviate(&head.oid)?,
        });
    }

    Err(DescribeError::NoTagsFound {
        head: head.oid.clone(),
    })
}
