//! cli
//!
//! Command-line interface layer for gitmeta.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Never write to the repository
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that call [`crate::engine`] for collection and [`crate::sink`]
//! for output.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use anyhow::Result;

/// Run the CLI application with already-parsed arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        project_version: cli.project_version.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}
