//! core
//!
//! Core domain types and algorithms for gitmeta.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, BranchName, TagName
//! - [`graph`] - Commit records and the ancestor walk
//! - [`tags`] - Tag index and tie-break policy
//! - [`describe`] - Nearest-tag descriptor of a commit
//! - [`metadata`] - Metadata assembly and prefix fan-out
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Everything here reads through [`crate::git::RepositoryQuery`], never git2
//! - Results are derived per invocation and never mutated

pub mod config;
pub mod describe;
pub mod graph;
pub mod metadata;
pub mod tags;
pub mod types;
