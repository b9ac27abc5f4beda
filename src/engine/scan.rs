//! engine::scan
//!
//! Repository scanning.
//!
//! The scanner reads everything the assembler needs from the repository
//! exactly once and freezes it in a [`RepositorySnapshot`]:
//! - The HEAD commit and its abbreviated id
//! - The checked-out branch (none when detached)
//! - The dirty state of the working tree
//!
//! # Invariants
//!
//! - Scan is read-only; it never mutates the repository
//! - Scan is deterministic given the same repository state

use crate::core::metadata::RepositorySnapshot;
use crate::git::{GitError, RepositoryQuery};

/// Scan the repository into a snapshot.
///
/// # Errors
///
/// - [`GitError::RefNotFound`] if HEAD is unborn
/// - Any other [`GitError`] from reading the repository
pub fn scan<R: RepositoryQuery>(
    repo: &R,
    ignore_untracked: bool,
) -> Result<RepositorySnapshot, GitError> {
    let head = repo.head()?;
    let head_abbrev = repo.abbreviate(&head.oid)?;
    let branch = repo.branch()?;
    let dirty = repo.is_dirty(ignore_untracked)?;

    tracing::debug!(
        head = %head.oid,
        branch = branch.as_ref().map(|b| b.as_str()).unwrap_or("(detached)"),
        dirty,
        "scanned repository"
    );

    Ok(RepositorySnapshot {
        head,
        head_abbrev,
        branch,
        dirty,
    })
}
