//! ICS file generation and parsing.
//!
//! tcal reads and writes a compact subset of RFC 5545: one VCALENDAR holding
//! VEVENTs with DTSTAMP, UID, DTSTART, DTEND/DURATION, CATEGORIES, PRIORITY
//! and a single-frequency RRULE.

use chrono::NaiveDateTime;

mod generate;
mod parse;

pub use generate::generate_calendar;
pub use parse::{parse_calendar, parse_duration, parse_timestamp};

/// Format a timestamp as `yyyymmddThhmmss`.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y%m%dT%H%M%S").to_string()
}
