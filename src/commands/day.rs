use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};

use crate::commands::CalendarContext;
use crate::render::{render_day_header, render_event_lines};

pub fn run(ctx: &CalendarContext, date: NaiveDate) -> Result<()> {
    for line in day_lines(ctx, date) {
        println!("{}", line);
    }
    Ok(())
}

/// Header plus event lines for one day.
pub fn day_lines(ctx: &CalendarContext, date: NaiveDate) -> Vec<String> {
    let events = ctx.calendar.events_on_day(date.and_time(NaiveTime::MIN));

    let mut lines = vec![render_day_header(date)];
    lines.extend(render_event_lines(&events));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;

    #[test]
    fn lists_the_days_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        ctx.calendar.add_event(meeting());

        let lines = day_lines(&ctx, NaiveDate::from_ymd_opt(2011, 3, 30).unwrap());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("30.03.2011"));
        assert!(lines[1].contains("Meeting"));
    }

    #[test]
    fn other_days_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        ctx.calendar.add_event(meeting());

        let lines = day_lines(&ctx, NaiveDate::from_ymd_opt(2011, 3, 31).unwrap());
        assert!(lines[1].contains("No events"));
    }
}
