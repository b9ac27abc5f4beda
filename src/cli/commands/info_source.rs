//! info-source command - Generate a source file exposing the metadata

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context as _, Result};

use super::Session;
use crate::cli::args::Overrides;
use crate::core::config::schema::{is_identifier, validate_package};
use crate::engine::Context;
use crate::sink::{InfoSource, TextEncoding};
use crate::ui::output;

/// Command-line values; unset ones come from configuration.
#[derive(Debug, Default)]
pub struct InfoSourceArgs {
    pub package: Option<String>,
    pub class_name: Option<String>,
    pub template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub encoding: Option<TextEncoding>,
}

/// Generate the info source file.
pub fn info_source(ctx: &Context, overrides: &Overrides, args: InfoSourceArgs) -> Result<()> {
    let session = Session::open(ctx, overrides)?;
    let config = &session.config;

    let class_name = args.class_name.unwrap_or_else(|| config.info_class_name());
    if !is_identifier(&class_name) {
        anyhow::bail!("class name '{}' is not an identifier", class_name);
    }
    let package = args.package.unwrap_or_else(|| config.info_package());
    validate_package(&package)?;

    let encoding = match args.encoding {
        Some(encoding) => encoding,
        None => TextEncoding::from_str(&config.info_encoding()).map_err(anyhow::Error::msg)?,
    };

    // Relative paths are resolved against --cwd
    let work_dir = ctx.work_dir();
    let output_dir = args.output_dir.unwrap_or_else(|| config.info_output_dir());
    let generator = InfoSource {
        package,
        class_name,
        template: args
            .template
            .or_else(|| config.info_template())
            .map(|t| work_dir.join(t)),
        output_dir: work_dir.join(output_dir),
        encoding,
    };

    let set = session
        .collect()
        .context("Could not get all information from repository")?;
    let (path, outcome) = generator
        .generate(&set)
        .context("Could not create info source")?;

    output::report_write(
        outcome,
        format!("Generated {}", path.display()),
        &path,
        session.verbosity,
    );

    Ok(())
}
