use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use owo_colors::OwoColorize;

use tcal_core::{Event, EventLike};

use crate::commands::CalendarContext;
use crate::input::present_duration;
use crate::render::Render;

pub fn run(ctx: &CalendarContext, date: NaiveDate) -> Result<()> {
    for line in month_lines(ctx, date) {
        println!("{}", line);
    }
    Ok(())
}

/// High-priority events of the month, then time spent per category.
fn month_lines(ctx: &CalendarContext, date: NaiveDate) -> Vec<String> {
    let ts = date.and_time(NaiveTime::MIN);
    let mut events = ctx.calendar.high_priority_events_in_month(ts);
    events.sort_by_key(|event| event.start());

    let mut lines = vec![date.format("%B %Y").bold().to_string()];

    if events.is_empty() {
        lines.push(format!("   {}", "No high-priority events".dimmed()));
        return lines;
    }

    for event in &events {
        lines.push(format!("   {:<10} {}", event_date(event).dimmed(), event.render()));
    }

    lines.push(String::new());
    lines.push("   Time per category:".dimmed().to_string());
    lines.extend(summary_lines(&ctx.calendar.category_durations_in_month(ts)));
    lines
}

fn event_date(event: &Event) -> String {
    if event.is_repeating() {
        "recurring".to_string()
    } else {
        event.start().format("%d.%m.%Y").to_string()
    }
}

fn summary_lines(durations: &BTreeMap<String, i64>) -> Vec<String> {
    durations
        .iter()
        .map(|(category, ms)| format!("   {}: {}", category, present_duration(*ms)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;

    #[test]
    fn lists_events_and_category_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        ctx.calendar.add_event(meeting());

        let lines = month_lines(&ctx, NaiveDate::from_ymd_opt(2011, 3, 1).unwrap());
        assert!(lines[0].contains("March 2011"));
        assert!(lines[1].contains("Meeting"));
        assert_eq!(lines.last().unwrap(), "   Meeting: 2h");
    }

    #[test]
    fn low_priority_months_have_no_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        let mut event = meeting();
        event.set_priority(7).unwrap();
        ctx.calendar.add_event(event);

        let lines = month_lines(&ctx, NaiveDate::from_ymd_opt(2011, 3, 1).unwrap());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("No high-priority events"));
    }
}
