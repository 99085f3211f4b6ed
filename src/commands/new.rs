use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, ValueEnum};
use owo_colors::OwoColorize;
use tcal_core::event::{PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_MEDIUM};
use tcal_core::field::{Field, end_of};
use tcal_core::{Event, EventLike, Frequency, RecurrenceRule, TCalConfig};

use crate::commands::CalendarContext;
use crate::input::{parse_date, parse_time};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    fn value(self) -> u8 {
        match self {
            Priority::Low => PRIORITY_LOW,
            Priority::Medium => PRIORITY_MEDIUM,
            Priority::High => PRIORITY_HIGH,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Repeat {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<Repeat> for Frequency {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::Daily => Frequency::Daily,
            Repeat::Weekly => Frequency::Weekly,
            Repeat::Monthly => Frequency::Monthly,
            Repeat::Yearly => Frequency::Yearly,
        }
    }
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Day of the event (ddmm, ddmmyy, ddmmyyyy or dd.mm.yyyy)
    #[arg(short, long)]
    pub date: String,

    /// Start time (h, hh, hhmm or hh:mm)
    #[arg(short, long)]
    pub start: String,

    /// End time (h, hh, hhmm or hh:mm)
    #[arg(short, long)]
    pub end: String,

    /// Category, e.g. "Lecture" (defaults to "Event")
    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(short, long, value_enum)]
    pub priority: Option<Priority>,

    /// Repeat the event
    #[arg(short, long, value_enum)]
    pub repeat: Option<Repeat>,

    /// Repeat every N days/weeks/months/years
    #[arg(long, requires = "repeat")]
    pub interval: Option<u32>,

    /// Last day the event repeats on
    #[arg(long, requires = "repeat")]
    pub until: Option<String>,
}

pub fn run(ctx: &mut CalendarContext, args: NewArgs, today: NaiveDate) -> Result<()> {
    let event = build_event(&args, today, &ctx.config)?;

    let replaces = !event.is_repeating()
        && ctx
            .calendar
            .events()
            .any(|e| !e.is_repeating() && e.start() == event.start());

    ctx.calendar.add_event(event.clone());
    let path = ctx.save()?;

    if replaces {
        println!("{}", "  Replaced the event starting at the same time".yellow());
    }
    println!("{}", format!("  Created: {}", event).green());
    println!("  {} {}", "UID:".dimmed(), event.uid().dimmed());
    tracing::debug!(path = %path.display(), "calendar saved");

    Ok(())
}

fn build_event(args: &NewArgs, today: NaiveDate, config: &TCalConfig) -> Result<Event> {
    let date = parse_date(&args.date, today)?;
    let start = date.and_time(parse_time(&args.start)?);
    let end = date.and_time(parse_time(&args.end)?);

    let mut event = Event::new(start, end)?;
    event.set_uid(config.new_uid(event.date_stamp()))?;

    if let Some(category) = &args.category {
        event.set_category(category.as_str());
    }

    if let Some(priority) = args.priority {
        event.set_priority(priority.value())?;
    }

    if let Some(repeat) = args.repeat {
        // an UNTIL day still includes its own occurrence
        let until = match &args.until {
            Some(input) => Some(end_of(parse_date(input, today)?.and_time(NaiveTime::MIN), Field::Day)),
            None => None,
        };
        let rule = RecurrenceRule::new(repeat.into(), args.interval.unwrap_or(1), until)?;
        event.set_repeat(rule);
    }

    Ok(event)
}
