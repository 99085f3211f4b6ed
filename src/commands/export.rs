use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::commands::CalendarContext;

pub fn run(ctx: &CalendarContext, target: &Path) -> Result<()> {
    let written = ctx
        .calendar
        .save(target, &ctx.config)
        .with_context(|| format!("Could not export to {}", target.display()))?;

    println!(
        "{}",
        format!(
            "  Exported {} events to {}",
            ctx.calendar.len(),
            written.display()
        )
        .green()
    );
    Ok(())
}
