//! TUI rendering traits for tcal types.
//!
//! Extension traits that add colored terminal rendering to tcal-core types
//! using owo_colors.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use tcal_core::{Event, EventLike, Frequency, RecurrenceRule};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let category = if self.is_high_priority() {
            format!("{} {}", self.category().bold(), "!".red())
        } else {
            self.category().to_string()
        };

        let repeat = self
            .recurrence()
            .map(|rule| format!(" ({})", rule.render()))
            .unwrap_or_default();

        format!(
            "{} {}{}  {}",
            self.text_duration().cyan(),
            category,
            repeat.dimmed(),
            self.uid().dimmed()
        )
    }
}

impl Render for RecurrenceRule {
    fn render(&self) -> String {
        let every = match self.interval() {
            1 => self.frequency().to_string(),
            n => format!("every {} {}s", n, unit(self.frequency())),
        };

        match self.until() {
            Some(until) => format!("{} until {}", every, until.format("%d.%m.%Y")),
            None => every,
        }
    }
}

fn unit(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "day",
        Frequency::Weekly => "week",
        Frequency::Monthly => "month",
        Frequency::Yearly => "year",
    }
}

/// Heading for one day, e.g. `Wednesday 30.03.2011`.
pub fn render_day_header(date: NaiveDate) -> String {
    date.format("%A %d.%m.%Y").bold().to_string()
}

/// One indented line per event, earliest time of day first.
pub fn render_event_lines(events: &[&Event]) -> Vec<String> {
    if events.is_empty() {
        return vec![format!("   {}", "No events".dimmed())];
    }

    let mut events = events.to_vec();
    events.sort_by_key(|event| event.start().time());
    events
        .into_iter()
        .map(|event| format!("   {}", event.render()))
        .collect()
}
