//! engine
//!
//! Orchestrates metadata collection: Scan -> Tag index -> Describe -> Assemble.
//!
//! # Architecture
//!
//! The engine is the coordinator between the CLI and the core:
//!
//! 1. **Scan**: Read HEAD, branch and dirty state into a snapshot
//! 2. **Index**: Build the tag index under the configured filter
//! 3. **Describe**: Name HEAD relative to its nearest tag
//! 4. **Assemble**: Produce the flat metadata set
//!
//! # Invariants
//!
//! - The engine never writes to the repository
//! - Failures name the stage that failed
//! - Metadata is all-or-nothing
//!
//! # Example
//!
//! ```ignore
//! use gitmeta::engine::{collect, Settings};
//! use gitmeta::git::Git;
//!
//! let git = Git::open(Path::new("."))?;
//! let set = collect(&git, &Settings::from_config(&config), &build)?;
//! ```

pub mod runner;
pub mod scan;

pub use runner::{collect, RunError, Settings};
pub use scan::scan;

use std::path::PathBuf;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Project version passed through as VERSION.
    pub project_version: String,
}

impl Context {
    /// The directory commands run in.
    pub fn work_dir(&self) -> PathBuf {
        self.cwd.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
