mod commands;
mod input;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use commands::CalendarContext;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tcal")]
#[command(about = "Keep a calendar of one-off and recurring events in an .ics file")]
struct Cli {
    /// Calendar file to use instead of the configured one
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the events of a day (default today)
    Day {
        /// ddmm, ddmmyy, ddmmyyyy or dd.mm.yyyy
        date: Option<String>,
    },
    /// Show the events of each day of a week
    Week {
        /// Any day in the week
        date: Option<String>,
    },
    /// Show a month's high-priority events and the time spent per category
    Month {
        /// Any day in the month
        date: Option<String>,
    },
    /// Create a new event
    New(commands::new::NewArgs),
    /// Delete an event by UID
    Delete { uid: String },
    /// Add the events of another .ics file to the calendar
    Import { path: PathBuf },
    /// Write a copy of the calendar
    Export { path: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let today = Local::now().date_naive();
    let mut ctx = CalendarContext::load(cli.file)?;

    match cli.command {
        Commands::Day { date } => commands::day::run(&ctx, date_or_today(date, today)?),
        Commands::Week { date } => commands::week::run(&ctx, date_or_today(date, today)?),
        Commands::Month { date } => commands::month::run(&ctx, date_or_today(date, today)?),
        Commands::New(args) => commands::new::run(&mut ctx, args, today),
        Commands::Delete { uid } => commands::delete::run(&mut ctx, &uid),
        Commands::Import { path } => commands::import::run(&mut ctx, &path),
        Commands::Export { path } => commands::export::run(&ctx, &path),
    }
}

fn date_or_today(date: Option<String>, today: NaiveDate) -> Result<NaiveDate> {
    match date {
        Some(input) => input::parse_date(&input, today),
        None => Ok(today),
    }
}
