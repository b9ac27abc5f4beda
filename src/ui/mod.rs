//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Status output goes through this module so that quiet and debug modes
//! are handled in one place.

pub mod output;
