//! git
//!
//! Single interface for all Git reads.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. Every repository read flows
//! through [`RepositoryQuery`]. No other module should import `git2`, and
//! nothing here ever writes to a repository.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening ([`Git`])
//! - HEAD, branch and commit lookup
//! - Tag enumeration and dereferencing
//! - Abbreviated ids
//! - Dirty-state detection ([`status`])
//! - An in-memory stand-in for tests ([`MemoryRepository`])
//!
//! # Example
//!
//! ```ignore
//! use gitmeta::git::{Git, RepositoryQuery};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head()?;
//! let dirty = git.is_dirty(false)?;
//! ```

mod interface;
mod memory;
mod query;
pub mod status;

pub use interface::{Git, GitError, RepoInfo};
pub use memory::MemoryRepository;
pub use query::{RepositoryQuery, DEFAULT_ABBREV_LEN};
pub use status::WorktreeStatus;
