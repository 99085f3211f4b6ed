use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::CalendarContext;

pub fn run(ctx: &mut CalendarContext, uid: &str) -> Result<()> {
    let Some(event) = ctx.calendar.find_by_uid(uid).cloned() else {
        anyhow::bail!("No event with UID '{}' in {}", uid, ctx.path.display());
    };

    ctx.calendar.remove_event(&event);
    ctx.save()?;

    println!("{}", format!("  Deleted: {}", event).red());
    Ok(())
}
