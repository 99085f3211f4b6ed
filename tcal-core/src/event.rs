//! Event model: a timed interval with optional recurrence.
//!
//! `Event` is the only concrete event type. Queries, the store and the ICS
//! generator reach it through the `EventLike` trait, whose provided methods
//! carry the recurrence logic.

use std::fmt;

use chrono::{Datelike, Local, NaiveDateTime, SubsecRound, Timelike};
use uuid::Uuid;

use crate::error::{TCalError, TCalResult};
use crate::field::{Field, add_field, days_in_month, field_difference};

/// Category given to events that don't name one.
pub const DEFAULT_CATEGORY: &str = "Event";

/// Highest priority value the format allows.
pub const MAX_PRIORITY: u8 = 9;

pub const PRIORITY_HIGH: u8 = 1;
pub const PRIORITY_MEDIUM: u8 = 5;
pub const PRIORITY_LOW: u8 = 9;

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The calendar field one repetition steps over.
    pub fn field(self) -> Field {
        match self {
            Frequency::Daily => Field::Day,
            Frequency::Weekly => Field::Week,
            Frequency::Monthly => Field::Month,
            Frequency::Yearly => Field::Year,
        }
    }

    pub fn as_ics_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Parse a FREQ value, ignoring case.
    pub fn from_ics_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Some(Frequency::Daily),
            "WEEKLY" => Some(Frequency::Weekly),
            "MONTHLY" => Some(Frequency::Monthly),
            "YEARLY" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_ics_str().to_lowercase())
    }
}

/// Repetition rule attached to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
    until: Option<NaiveDateTime>,
}

impl RecurrenceRule {
    /// `interval` counts frequency units between occurrences and must be at
    /// least 1. `until = None` repeats forever.
    pub fn new(frequency: Frequency, interval: u32, until: Option<NaiveDateTime>) -> TCalResult<Self> {
        if interval == 0 {
            return Err(TCalError::InvalidEvent(
                "Recurrence interval must be at least 1".into(),
            ));
        }

        Ok(RecurrenceRule {
            frequency,
            interval,
            until,
        })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn field(&self) -> Field {
        self.frequency.field()
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn until(&self) -> Option<NaiveDateTime> {
        self.until
    }
}

/// What the rest of the engine needs to know about an event.
///
/// Implementors supply the accessors; validity testing and in-month duration
/// are derived from them.
pub trait EventLike {
    fn start(&self) -> NaiveDateTime;
    fn end(&self) -> NaiveDateTime;
    /// The moment a recurring event stops repeating (None = never).
    fn expiration(&self) -> Option<NaiveDateTime>;
    fn category(&self) -> &str;
    fn uid(&self) -> &str;
    fn date_stamp(&self) -> NaiveDateTime;
    /// 0 = unset, otherwise 1 (highest) to 9 (lowest).
    fn priority(&self) -> u8;
    fn recurrence(&self) -> Option<&RecurrenceRule>;

    fn is_repeating(&self) -> bool {
        self.recurrence().is_some()
    }

    fn repeat_field(&self) -> Option<Field> {
        self.recurrence().map(RecurrenceRule::field)
    }

    /// Repeat interval, 0 for non-repeating events.
    fn interval(&self) -> u32 {
        self.recurrence().map_or(0, RecurrenceRule::interval)
    }

    /// Length of one occurrence in milliseconds.
    fn duration(&self) -> i64 {
        (self.end() - self.start()).num_milliseconds()
    }

    /// Priorities 1 through 4 count as high.
    fn is_high_priority(&self) -> bool {
        (1..=4).contains(&self.priority())
    }

    /// Start and end times of day as `h:mm - h:mm`.
    fn text_duration(&self) -> String {
        let (start, end) = (self.start(), self.end());
        format!(
            "{}:{:02} - {}:{:02}",
            start.hour(),
            start.minute(),
            end.hour(),
            end.minute()
        )
    }

    /// Whether the event takes place within `[range_start, range_end)`.
    ///
    /// For non-repeating events this is the historical loose test: the event
    /// starts after `range_start` or ends before `range_end`.
    fn is_valid(&self, range_start: NaiveDateTime, range_end: NaiveDateTime) -> bool {
        let Some(rule) = self.recurrence() else {
            return self.start() > range_start || self.end() < range_end;
        };

        let expired = self.expiration().is_some_and(|exp| exp < range_end);
        if expired || self.start() > range_end {
            return false;
        }

        let field = rule.field();
        let cycles = field_difference(field, self.start(), range_start);
        // The range falls on a skipped cycle
        if cycles % i64::from(rule.interval()) != 0 {
            return false;
        }

        let occurrence_start = add_field(self.start(), field, cycles);
        let occurrence_end = add_field(self.end(), field, cycles);
        let inside = |ts: NaiveDateTime| ts >= range_start && ts < range_end;

        inside(occurrence_start)
            || inside(occurrence_end)
            || (occurrence_start < range_start && occurrence_end > range_end)
    }

    /// Total milliseconds the event occupies in the month starting at
    /// `first_of_month`.
    fn duration_in_month(&self, first_of_month: NaiveDateTime) -> i64 {
        let month_end = add_field(first_of_month, Field::Month, 1);
        let next_day = |day: NaiveDateTime| add_field(day, Field::Day, 1);

        let mut day = first_of_month;
        let mut first_valid = None;
        for _ in 0..days_in_month(first_of_month.year(), first_of_month.month()) {
            if self.is_valid(day, next_day(day)) {
                first_valid = Some(day);
                break;
            }
            day = next_day(day);
        }

        let Some(first_valid) = first_valid else {
            return 0;
        };

        let hits = match self.recurrence() {
            None => 1,
            Some(rule) => {
                let step = i64::from(rule.interval());
                let mut hits = 0;
                let mut current = first_valid;
                while current < month_end {
                    if self.is_valid(current, next_day(current)) {
                        hits += 1;
                    }
                    current = add_field(current, rule.field(), step);
                }
                hits
            }
        };

        self.duration() * hits
    }
}

/// A calendar event such as a meeting, lecture or exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    category: String,
    uid: String,
    date_stamp: NaiveDateTime,
    start: NaiveDateTime,
    end: NaiveDateTime,
    expiration: Option<NaiveDateTime>,
    priority: u8,
    recurrence: Option<RecurrenceRule>,
}

impl Event {
    /// A non-repeating event stamped with the current local time and given
    /// a random UID.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> TCalResult<Self> {
        check_order(start, end)?;

        Ok(Event {
            category: DEFAULT_CATEGORY.to_string(),
            uid: Uuid::new_v4().simple().to_string(),
            date_stamp: Local::now().naive_local().trunc_subsecs(0),
            start,
            end,
            expiration: Some(end),
            priority: 0,
            recurrence: None,
        })
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// UIDs are written as a single `UID:` line, so they must be non-empty
    /// and free of colons and line breaks.
    pub fn set_uid(&mut self, uid: impl Into<String>) -> TCalResult<()> {
        let uid = uid.into();
        if uid.is_empty() || uid.contains([':', '\r', '\n']) {
            return Err(TCalError::InvalidEvent(format!("Invalid UID '{uid}'")));
        }
        self.uid = uid;
        Ok(())
    }

    pub fn set_date_stamp(&mut self, date_stamp: NaiveDateTime) {
        self.date_stamp = date_stamp;
    }

    pub fn set_priority(&mut self, priority: u8) -> TCalResult<()> {
        if priority > MAX_PRIORITY {
            return Err(TCalError::InvalidEvent(format!(
                "Priority {} is outside the permitted bounds (0-{})",
                priority, MAX_PRIORITY
            )));
        }
        self.priority = priority;
        Ok(())
    }

    /// Move the event. A non-repeating event's expiration follows its end.
    pub fn set_new_start_end(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> TCalResult<()> {
        check_order(start, end)?;
        self.start = start;
        self.end = end;
        if self.recurrence.is_none() {
            self.expiration = Some(end);
        }
        Ok(())
    }

    /// Change when the event expires. On a recurring event this is the
    /// rule's UNTIL.
    pub fn set_expiration(&mut self, expiration: Option<NaiveDateTime>) {
        if let Some(rule) = self.recurrence.as_mut() {
            rule.until = expiration;
        }
        self.expiration = expiration;
    }

    pub fn set_repeat(&mut self, rule: RecurrenceRule) {
        self.expiration = rule.until;
        self.recurrence = Some(rule);
    }

    /// Drop the recurrence rule; the event becomes a one-off again.
    pub fn end_repeat(&mut self) {
        self.recurrence = None;
        self.expiration = Some(self.end);
    }
}

fn check_order(start: NaiveDateTime, end: NaiveDateTime) -> TCalResult<()> {
    if start > end {
        return Err(TCalError::InvalidEvent(format!(
            "Event ends ({}) before it starts ({})",
            end, start
        )));
    }
    Ok(())
}

impl EventLike for Event {
    fn start(&self) -> NaiveDateTime {
        self.start
    }

    fn end(&self) -> NaiveDateTime {
        self.end
    }

    fn expiration(&self) -> Option<NaiveDateTime> {
        self.expiration
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn uid(&self) -> &str {
        &self.uid
    }

    fn date_stamp(&self) -> NaiveDateTime {
        self.date_stamp
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn recurrence(&self) -> Option<&RecurrenceRule> {
        self.recurrence.as_ref()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.text_duration(), self.category)
    }
}
