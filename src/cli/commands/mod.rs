//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each metadata command handler:
//! 1. Opens the repository and loads configuration ([`Session::open`])
//! 2. Calls the engine to collect metadata
//! 3. Hands the metadata to a sink and reports the outcome
//!
//! Handlers never write to the repository.

mod completion;
mod describe;
mod info_source;
mod properties;
mod render;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use describe::describe;
pub use info_source::info_source;
pub use properties::properties;
pub use render::render;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, Overrides};
use crate::core::config::Config;
use crate::core::metadata::{BuildInfo, MetadataSet};
use crate::engine::{self, Context, Settings};
use crate::git::Git;
use crate::ui::output::{self, Verbosity};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Describe { overrides } => describe::describe(ctx, &overrides),
        Command::Properties {
            prefixes,
            output,
            json,
            overrides,
        } => properties::properties(ctx, &overrides, &prefixes, output.as_deref(), json),
        Command::Render {
            template,
            target,
            encoding,
            overrides,
        } => render::render(ctx, &overrides, &template, &target, encoding),
        Command::InfoSource {
            package,
            class_name,
            template,
            output_dir,
            encoding,
            overrides,
        } => info_source::info_source(
            ctx,
            &overrides,
            info_source::InfoSourceArgs {
                package,
                class_name,
                template,
                output_dir,
                encoding,
            },
        ),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// An opened repository with its effective settings.
pub(crate) struct Session {
    pub git: Git,
    pub config: Config,
    pub settings: Settings,
    pub build: BuildInfo,
    pub verbosity: Verbosity,
}

impl Session {
    /// Open the repository at the context's directory and resolve settings
    /// (defaults, then config files, then `overrides`).
    pub fn open(ctx: &Context, overrides: &Overrides) -> Result<Self> {
        let build = BuildInfo::new(ctx.project_version.clone());
        let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);

        let cwd = ctx.work_dir();
        let git = Git::open(&cwd).context("Failed to open repository")?;
        let info = git.info()?;

        let loaded = Config::load(Some(&info.work_dir)).context("Failed to load configuration")?;
        for warning in &loaded.warnings {
            output::warn(
                format!("{} ({})", warning.message, warning.path.display()),
                verbosity,
            );
        }
        if let Some(path) = loaded.config.repo_config_loaded_from() {
            output::debug(format!("repo config: {}", path.display()), verbosity);
        }
        if let Some(path) = loaded.config.global_config_loaded_from() {
            output::debug(format!("global config: {}", path.display()), verbosity);
        }

        let mut settings = Settings::from_config(&loaded.config);
        overrides.apply(&mut settings);

        Ok(Self {
            git,
            config: loaded.config,
            settings,
            build,
            verbosity,
        })
    }

    /// Run the pipeline.
    pub fn collect(&self) -> Result<MetadataSet> {
        Ok(engine::collect(&self.git, &self.settings, &self.build)?)
    }
}
