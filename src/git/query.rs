//! git::query
//!
//! The repository-query capability the core depends on.
//!
//! # Design
//!
//! The tag index, describe engine, dirty detector and pipeline only see
//! this trait. [`Git`](super::Git) implements it on top of git2;
//! [`MemoryRepository`](super::MemoryRepository) implements it over an
//! in-memory commit arena for deterministic tests.
//!
//! Every method is a read. Implementations must not mutate the repository.

use crate::core::graph::{AncestorWalk, Commit};
use crate::core::tags::Tag;
use crate::core::types::{BranchName, Oid};

use super::GitError;

/// Length of abbreviated ids when an implementation cannot check for
/// collisions.
pub const DEFAULT_ABBREV_LEN: usize = 7;

/// Read-only queries against a repository.
pub trait RepositoryQuery {
    /// The commit HEAD points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (no commits yet)
    fn head(&self) -> Result<Commit, GitError>;

    /// The checked-out branch, or `None` when HEAD is detached.
    fn branch(&self) -> Result<Option<BranchName>, GitError>;

    /// All tags, each resolved to the commit it ultimately names.
    fn list_tags(&self) -> Result<Vec<Tag>, GitError>;

    /// Read a single commit.
    fn commit(&self, oid: &Oid) -> Result<Commit, GitError>;

    /// Abbreviated form of `oid`.
    ///
    /// The default is a fixed [`DEFAULT_ABBREV_LEN`]-character prefix with
    /// no collision check.
    fn abbreviate(&self, oid: &Oid) -> Result<String, GitError> {
        Ok(oid.short(DEFAULT_ABBREV_LEN).to_string())
    }

    /// Whether the working tree or index differ from HEAD.
    ///
    /// Untracked files count only when `ignore_untracked` is false.
    fn is_dirty(&self, ignore_untracked: bool) -> Result<bool, GitError>;

    /// Start a fresh ancestor walk at `start`.
    ///
    /// Walks are single-use; request a new one for every traversal.
    fn walk_ancestors(&self, start: &Commit) -> AncestorWalk<'_, Self>
    where
        Self: Sized,
    {
        AncestorWalk::new(self, start.clone())
    }
}
