//! describe command - Print HEAD relative to its nearest tag

use anyhow::Result;

use super::Session;
use crate::cli::args::Overrides;
use crate::core::metadata::MetadataKey;
use crate::engine::Context;

/// Print the DESCRIBE value, dirty suffix included.
pub fn describe(ctx: &Context, overrides: &Overrides) -> Result<()> {
    let session = Session::open(ctx, overrides)?;
    let set = session.collect()?;

    println!("{}", set.value(MetadataKey::Describe).unwrap_or_default());
    Ok(())
}
