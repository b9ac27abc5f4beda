//! gitmeta - Build metadata from a git repository
//!
//! gitmeta reads a local repository and derives the facts a build wants to
//! stamp into its artifacts: branch, commit ids and author, a
//! `git describe`-style name for HEAD, whether the working tree is dirty,
//! and a build timestamp. The result is published as a prefixed property
//! table, substituted into templates, or generated as a source file.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Scan -> Tag index -> Describe -> Assemble
//! - [`core`] - Domain types, commit walk, tags, describe, metadata, config
//! - [`git`] - Single interface for all Git reads
//! - [`sink`] - Property tables, template rendering, info source generation
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! gitmeta maintains the following invariants:
//!
//! 1. The repository is never written to
//! 2. Metadata is all-or-nothing; a failed stage yields no partial set
//! 3. A clean, exactly-tagged HEAD describes as the bare tag name
//! 4. TAG_NAME never carries the dirty suffix

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod sink;
pub mod ui;
