//! render command - Filtered copy of a template

use std::path::Path;

use anyhow::{Context as _, Result};

use super::Session;
use crate::cli::args::Overrides;
use crate::engine::Context;
use crate::sink::{filter_copy, TextEncoding};
use crate::ui::output;

/// Copy `template` to `target`, substituting metadata placeholders.
pub fn render(
    ctx: &Context,
    overrides: &Overrides,
    template: &Path,
    target: &Path,
    encoding: Option<TextEncoding>,
) -> Result<()> {
    let session = Session::open(ctx, overrides)?;
    let set = session.collect()?;

    let template = ctx.work_dir().join(template);
    let target = ctx.work_dir().join(target);
    let outcome = filter_copy(&template, &target, &set, encoding.unwrap_or_default())
        .context("Could not render template")?;

    output::report_write(
        outcome,
        format!("Rendered {} to {}", template.display(), target.display()),
        &target,
        session.verbosity,
    );

    Ok(())
}
