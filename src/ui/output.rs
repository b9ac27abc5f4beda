//! ui::output
//!
//! Status messages on the terminal.
//!
//! Command results (a describe string, a property table) are printed by the
//! command itself and are never silenced. Everything here is status: it goes
//! through [`Verbosity`] so `--quiet` and `--debug` behave the same in every
//! command.

use std::fmt::Display;
use std::path::Path;

use crate::sink::CopyOutcome;

/// How much status output to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    fn shows_status(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// Status line on stdout.
pub fn status(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_status() {
        println!("{message}");
    }
}

/// Diagnostic line on stderr, `--debug` only.
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {message}");
    }
}

/// Warning on stderr unless quiet.
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_status() {
        eprintln!("warning: {message}");
    }
}

/// Error on stderr, always shown.
pub fn error(message: impl Display) {
    eprintln!("error: {message}");
}

/// The status line for a sink write to `target`.
///
/// `written` describes a fresh write; an untouched target is reported as
/// up to date.
pub fn write_summary(outcome: CopyOutcome, written: impl Display, target: &Path) -> String {
    match outcome {
        CopyOutcome::Written => written.to_string(),
        CopyOutcome::Unchanged => format!("{} is up to date", target.display()),
    }
}

/// Print [`write_summary`] as a status line.
pub fn report_write(
    outcome: CopyOutcome,
    written: impl Display,
    target: &Path,
    verbosity: Verbosity,
) {
    status(write_summary(outcome, written, target), verbosity);
}
