//! properties command - Print or write the prefixed property table

use std::path::Path;

use anyhow::{Context as _, Result};

use super::Session;
use crate::cli::args::Overrides;
use crate::core::config::schema::validate_prefix;
use crate::engine::Context;
use crate::sink::PropertyTable;
use crate::ui::output;

/// Print or write every metadata key under every prefix.
///
/// `prefixes` replaces the configured namespaces when non-empty. JSON is
/// only printed, never written.
pub fn properties(
    ctx: &Context,
    overrides: &Overrides,
    prefixes: &[String],
    output_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    for prefix in prefixes {
        validate_prefix(prefix)?;
    }

    let session = Session::open(ctx, overrides)?;
    let set = session.collect()?;

    let prefixes = if prefixes.is_empty() {
        session.config.prefixes()
    } else {
        prefixes.to_vec()
    };

    let mut table = PropertyTable::new();
    table.merge(&set, &prefixes);

    match output_path {
        None if json => println!("{}", table.to_json()?),
        None => print!("{}", table.to_properties_string()),
        Some(path) => {
            let path = ctx.work_dir().join(path);
            let outcome = table
                .write_to(&path)
                .with_context(|| format!("Failed to write properties to {}", path.display()))?;
            output::report_write(
                outcome,
                format!("Wrote {} properties to {}", table.len(), path.display()),
                &path,
                session.verbosity,
            );
        }
    }

    Ok(())
}
