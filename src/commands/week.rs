use anyhow::Result;
use chrono::{Days, NaiveDate, NaiveTime};
use tcal_core::field::{Field, start_of};

use crate::commands::CalendarContext;
use crate::commands::day::day_lines;

pub fn run(ctx: &CalendarContext, date: NaiveDate) -> Result<()> {
    for (i, day) in week_days(date).into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in day_lines(ctx, day) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Monday through Sunday of the week containing `date`.
fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = start_of(date.and_time(NaiveTime::MIN), Field::Week).date();
    (0..7)
        .filter_map(|offset| monday.checked_add_days(Days::new(offset)))
        .collect()
}
