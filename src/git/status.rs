//! git::status
//!
//! Dirty-state detection.
//!
//! # Rules
//!
//! A working tree is dirty when, relative to HEAD, anything tracked has
//! changed: staged additions, modifications, deletions, renames and type
//! changes in the index, the same in the working tree, and unresolved
//! conflicts. Untracked files make it dirty only when the caller does not
//! ask to ignore them. Ignored files never count.
//!
//! libgit2 produces both comparisons (workdir vs index, index vs HEAD tree)
//! in a single status enumeration; `counts_as_dirty` classifies one entry
//! of that enumeration so the caller can stop at the first hit.

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// No staged, unstaged or conflicting changes. Untracked files are
    /// not considered.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }

    /// Whether this status makes the build dirty.
    ///
    /// # Example
    ///
    /// ```
    /// use gitmeta::git::WorktreeStatus;
    ///
    /// let status = WorktreeStatus { untracked: 2, ..Default::default() };
    /// assert!(status.is_dirty(false));
    /// assert!(!status.is_dirty(true));
    /// ```
    pub fn is_dirty(&self, ignore_untracked: bool) -> bool {
        !self.is_clean() || (!ignore_untracked && self.untracked > 0)
    }
}

fn is_staged(status: git2::Status) -> bool {
    status.intersects(
        git2::Status::INDEX_NEW
            | git2::Status::INDEX_MODIFIED
            | git2::Status::INDEX_DELETED
            | git2::Status::INDEX_RENAMED
            | git2::Status::INDEX_TYPECHANGE,
    )
}

fn is_unstaged(status: git2::Status) -> bool {
    status.intersects(
        git2::Status::WT_MODIFIED
            | git2::Status::WT_DELETED
            | git2::Status::WT_RENAMED
            | git2::Status::WT_TYPECHANGE,
    )
}

/// Whether a single status entry makes the tree dirty.
pub(super) fn counts_as_dirty(status: git2::Status, ignore_untracked: bool) -> bool {
    if status.is_ignored() {
        return false;
    }
    status.is_conflicted()
        || is_staged(status)
        || is_unstaged(status)
        || (!ignore_untracked && status.is_wt_new())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod worktree_status {
        use super::*;

        #[test]
        fn default_is_clean() {
            let status = WorktreeStatus::default();
            assert!(status.is_clean());
            assert!(!status.is_dirty(false));
        }

        #[test]
        fn staged_changes_are_dirty() {
            let status = WorktreeStatus {
                staged: 1,
                ..Default::default()
            };
            assert!(status.is_dirty(true));
        }

        #[test]
        fn conflicts_are_dirty() {
            let status = WorktreeStatus {
                has_conflicts: true,
                ..Default::default()
            };
            assert!(status.is_dirty(true));
        }

        #[test]
        fn untracked_depends_on_flag() {
            let status = WorktreeStatus {
                untracked: 5,
                ..Default::default()
            };
            assert!(status.is_clean());
            assert!(status.is_dirty(false));
            assert!(!status.is_dirty(true));
        }
    }

    mod classify {
        use super::*;

        #[test]
        fn tracked_changes() {
            for flag in [
                git2::Status::INDEX_NEW,
                git2::Status::INDEX_DELETED,
                git2::Status::WT_MODIFIED,
                git2::Status::WT_DELETED,
                git2::Status::WT_TYPECHANGE,
                git2::Status::CONFLICTED,
            ] {
                assert!(counts_as_dirty(flag, true), "{flag:?}");
            }
        }

        #[test]
        fn untracked_and_ignored() {
            assert!(counts_as_dirty(git2::Status::WT_NEW, false));
            assert!(!counts_as_dirty(git2::Status::WT_NEW, true));
            assert!(!counts_as_dirty(git2::Status::IGNORED, false));
            assert!(!counts_as_dirty(git2::Status::CURRENT, false));
        }
    }
}
