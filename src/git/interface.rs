//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to git2. Everything the rest of
//! the crate learns about a repository flows through [`Git`], which
//! implements [`RepositoryQuery`] and normalizes git2 errors into
//! [`GitError`].
//!
//! # Error Handling
//!
//! Every variant of [`GitError`] means the repository could not be read
//! the way we needed. They are fatal for the invocation:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref does not exist (including an unborn HEAD)
//! - [`GitError::ObjectNotFound`]: A commit or tag object is missing
//! - [`GitError::Internal`]: Anything else libgit2 reports
//!
//! # Example
//!
//! ```ignore
//! use gitmeta::git::{Git, RepositoryQuery};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head()?;
//! println!("HEAD is at {}", git.abbreviate(&head.oid)?);
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::query::RepositoryQuery;
use super::status;
use crate::core::graph::Commit;
use crate::core::tags::Tag;
use crate::core::types::{BranchName, Oid, TagName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => {
                if context == "HEAD" || context.starts_with("refs/") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidBranchName(msg) | TypeError::InvalidTagName(msg) => {
                GitError::InvalidRefName { message: msg }
            }
        }
    }
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory
    pub git_dir: PathBuf,
    /// Path to working directory
    pub work_dir: PathBuf,
}

/// The Git interface.
///
/// All reads go through here; nothing in this crate writes to a
/// repository.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

fn to_oid(oid: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(oid.to_string()).map_err(Into::into)
}

fn to_utc(time: git2::Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.seconds(), 0).unwrap_or(DateTime::UNIX_EPOCH)
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        // Dirty detection needs a working tree
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get repository information (git_dir and work_dir paths).
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        let git_dir = self.repo.path().to_path_buf();
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(RepoInfo { git_dir, work_dir })
    }

    fn git_oid(oid: &Oid) -> Result<git2::Oid, GitError> {
        git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    fn read_commit(commit: &git2::Commit<'_>) -> Result<Commit, GitError> {
        let author = commit.author();
        let parents = commit
            .parent_ids()
            .map(to_oid)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Commit {
            oid: to_oid(commit.id())?,
            parents,
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time: to_utc(author.when()),
            commit_time: to_utc(commit.committer().when()),
            message: commit.message().unwrap_or("").to_string(),
        })
    }

    /// Resolve the object a tag ref points at into a [`Tag`].
    ///
    /// Annotated tags are dereferenced to their target, and one more level
    /// when that target is itself a tag object. Tags that end up on
    /// something other than a commit are skipped.
    fn resolve_tag(&self, name: TagName, direct: git2::Oid) -> Result<Option<Tag>, GitError> {
        let context = format!("refs/tags/{name}");
        let object = self
            .repo
            .find_object(direct, None)
            .map_err(|e| GitError::from_git2(e, &context))?;

        let annotation = match object.into_tag() {
            Ok(annotation) => annotation,
            Err(object) => {
                if object.kind() == Some(git2::ObjectType::Commit) {
                    return Ok(Some(Tag::lightweight(name, to_oid(object.id())?)));
                }
                tracing::debug!(tag = %name, kind = ?object.kind(), "skipping tag on non-commit");
                return Ok(None);
            }
        };

        let target = annotation
            .target()
            .map_err(|e| GitError::from_git2(e, &context))?;
        let target = match target.into_tag() {
            Ok(nested) => nested
                .target()
                .map_err(|e| GitError::from_git2(e, &context))?,
            Err(target) => target,
        };
        if target.kind() != Some(git2::ObjectType::Commit) {
            tracing::debug!(tag = %name, kind = ?target.kind(), "skipping tag on non-commit");
            return Ok(None);
        }

        Ok(Some(Tag {
            name,
            target: to_oid(target.id())?,
            annotated: true,
            message: annotation.message().map(|m| m.trim_end().to_string()),
            created: annotation.tagger().map(|sig| to_utc(sig.when())),
        }))
    }
}

impl RepositoryQuery for Git {
    fn head(&self) -> Result<Commit, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        Self::read_commit(&commit)
    }

    /// Returns `None` if HEAD is detached or unborn.
    fn branch(&self) -> Result<Option<BranchName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(Some(BranchName::new(name)?));
            }
        }

        Ok(None)
    }

    fn list_tags(&self) -> Result<Vec<Tag>, GitError> {
        let refs = self
            .repo
            .references_glob("refs/tags/*")
            .map_err(|e| GitError::from_git2(e, "refs/tags/"))?;

        let mut tags = Vec::new();
        for reference in refs {
            let reference = reference.map_err(|e| GitError::from_git2(e, "refs/tags/"))?;

            let Some(refname) = reference.name().map(str::to_string) else {
                tracing::warn!("skipping tag ref with a non-UTF-8 name");
                continue;
            };
            let name = match TagName::from_ref(&refname) {
                Some(Ok(name)) => name,
                Some(Err(e)) => {
                    tracing::warn!(refname, error = %e, "skipping tag with invalid name");
                    continue;
                }
                None => continue,
            };

            let resolved = reference
                .resolve()
                .map_err(|e| GitError::from_git2(e, &refname))?;
            let direct = resolved.target().ok_or_else(|| GitError::RefNotFound {
                refname: refname.clone(),
            })?;

            if let Some(tag) = self.resolve_tag(name, direct)? {
                tags.push(tag);
            }
        }

        Ok(tags)
    }

    fn commit(&self, oid: &Oid) -> Result<Commit, GitError> {
        let commit = self
            .repo
            .find_commit(Self::git_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        Self::read_commit(&commit)
    }

    /// Shortest unambiguous prefix, never shorter than `core.abbrev`
    /// (7 unless configured).
    fn abbreviate(&self, oid: &Oid) -> Result<String, GitError> {
        let object = self
            .repo
            .find_object(Self::git_oid(oid)?, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let short = object
            .short_id()
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        short
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GitError::InvalidOid {
                oid: oid.to_string(),
            })
    }

    /// Single status pass: index vs HEAD and workdir vs index together,
    /// ignored files excluded, untracked directories not recursed.
    fn is_dirty(&self, ignore_untracked: bool) -> Result<bool, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(!ignore_untracked)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        Ok(statuses
            .iter()
            .any(|entry| status::counts_as_dirty(entry.status(), ignore_untracked)))
    }
}
