//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--project-version <v>`: Version published as VERSION
//!
//! # Metadata Overrides
//!
//! Every command that collects metadata accepts [`Overrides`], which win
//! over both configuration files.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::metadata::DirtyFlag;
use crate::engine::Settings;
use crate::sink::TextEncoding;

/// gitmeta - build metadata from a git repository
#[derive(Parser, Debug)]
#[command(name = "gitmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gitmeta was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Version published as VERSION
    #[arg(
        long,
        global = true,
        env = "GITMETA_PROJECT_VERSION",
        value_name = "VERSION",
        default_value = ""
    )]
    pub project_version: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Per-invocation overrides of configured settings.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Suffix appended to ids and DESCRIBE when the tree is dirty ("null" disables)
    #[arg(
        long,
        value_name = "SUFFIX",
        allow_hyphen_values = true,
        conflicts_with = "no_dirty_flag"
    )]
    pub dirty_flag: Option<String>,

    /// Never append a dirty suffix; DIRTY is still reported
    #[arg(long)]
    pub no_dirty_flag: bool,

    /// Ignore untracked files when checking for changes
    #[arg(long)]
    pub ignore_untracked: bool,

    /// Fall back to the abbreviated commit id when no tag is reachable
    #[arg(long)]
    pub always: bool,

    /// strftime pattern for TIMESTAMP and COMMIT_DATE
    #[arg(long, value_name = "PATTERN")]
    pub date_format: Option<String>,
}

impl Overrides {
    /// Apply these overrides on top of configured settings.
    pub fn apply(&self, settings: &mut Settings) {
        if self.no_dirty_flag {
            settings.assembly.dirty_flag = DirtyFlag::Disabled;
        } else if let Some(flag) = &self.dirty_flag {
            settings.assembly.dirty_flag = DirtyFlag::from_setting(flag);
        }
        if let Some(pattern) = &self.date_format {
            settings.assembly.date_format = pattern.clone();
        }
        if self.ignore_untracked {
            settings.ignore_untracked = true;
        }
        if self.always {
            settings.describe_always = true;
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the describe string of HEAD
    #[command(
        name = "describe",
        long_about = "Print HEAD relative to its nearest reachable tag.\n\n\
            The output is the tag name when HEAD is tagged, otherwise \
            TAG-DISTANCE-gABBREV, where DISTANCE counts the commits walked \
            before reaching the tag. The dirty suffix is appended when the \
            working tree has changes.",
        after_help = "\
EXAMPLES:
    # Describe HEAD
    gitmeta describe

    # Never fail on untagged repositories
    gitmeta describe --always

    # Report a modified tree without a suffix
    gitmeta describe --no-dirty-flag"
    )]
    Describe {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print or write the prefixed property table
    #[command(
        name = "properties",
        long_about = "Print or write every metadata key under every prefix.\n\n\
            Keys are published as PREFIX.key.name, e.g. COMMIT_ABBREV under the \
            'git' prefix becomes git.commit.abbrev. Without --prefix the \
            configured prefixes are used (default: gitmeta, git).",
        after_help = "\
EXAMPLES:
    # Print properties to stdout
    gitmeta properties

    # Write a properties file for the build
    gitmeta properties --output target/git.properties

    # JSON under a custom namespace
    gitmeta properties --prefix build --json"
    )]
    Properties {
        /// Namespace for keys (repeatable)
        #[arg(long = "prefix", value_name = "PREFIX")]
        prefixes: Vec<String>,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print JSON instead of properties syntax
        #[arg(long, conflicts_with = "output")]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Copy a template, substituting {KEY} placeholders
    #[command(
        name = "render",
        long_about = "Copy TEMPLATE to TARGET, replacing {KEY} placeholders.\n\n\
            Unknown placeholders are left as they are. TARGET's parent \
            directories are created, the write is atomic, and an up-to-date \
            TARGET is not touched.",
        after_help = "\
EXAMPLES:
    # Stamp a version file
    gitmeta render version.txt.in target/version.txt

    # Write Latin-1 output
    gitmeta render about.in about.txt --encoding ISO-8859-1"
    )]
    Render {
        /// Template file (UTF-8)
        template: PathBuf,

        /// Output file
        target: PathBuf,

        /// Output encoding (UTF-8, ISO-8859-1, US-ASCII)
        #[arg(long, value_name = "ENCODING")]
        encoding: Option<TextEncoding>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Generate a source file exposing the metadata as constants
    #[command(
        name = "info-source",
        long_about = "Generate a source file exposing the metadata as constants.\n\n\
            The file is written to OUTPUT_DIR/PACKAGE/CLASS_NAME.rs. The template \
            sees every metadata key plus CLASS_NAME and PACKAGE_NAME.",
        after_help = "\
EXAMPLES:
    # Use the configured or default settings
    gitmeta info-source

    # Generate into src/generated/build/GitInfo.rs
    gitmeta info-source --output-dir src/generated --package build"
    )]
    InfoSource {
        /// Module path (`a::b` or `a.b`)
        #[arg(long)]
        package: Option<String>,

        /// Name of the generated type
        #[arg(long)]
        class_name: Option<String>,

        /// Template file (built-in template if omitted)
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Root directory for generated sources
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Output encoding (UTF-8, ISO-8859-1, US-ASCII)
        #[arg(long, value_name = "ENCODING")]
        encoding: Option<TextEncoding>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    gitmeta completion bash > /etc/bash_completion.d/gitmeta

    # Zsh
    gitmeta completion zsh > \"${fpath[1]}/_gitmeta\""
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
