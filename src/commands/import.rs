use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::commands::CalendarContext;

pub fn run(ctx: &mut CalendarContext, source: &Path) -> Result<()> {
    let count = ctx
        .calendar
        .merge_load(source)
        .with_context(|| format!("Could not import {}", source.display()))?;
    let path = ctx.save()?;

    println!(
        "{}",
        format!("  Imported {} events into {}", count, path.display()).green()
    );
    Ok(())
}
