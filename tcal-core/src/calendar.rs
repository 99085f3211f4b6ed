//! In-memory calendar store and its file boundary.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::config::TCalConfig;
use crate::error::TCalResult;
use crate::event::{Event, EventLike};
use crate::field::{Field, end_of, start_of};
use crate::ics::{generate_calendar, parse_calendar};

/// Extension `save` makes sure a calendar file carries.
const ICS_EXTENSION: &str = "ics";

/// A set of events, split by whether they repeat.
///
/// One-off events are keyed by their start, so adding a second event that
/// starts at the same moment replaces the first. Repeating events are kept
/// in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Calendar {
    non_repeating: BTreeMap<NaiveDateTime, Event>,
    repeating: Vec<Event>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, event: Event) {
        if event.is_repeating() {
            self.repeating.push(event);
        } else {
            self.non_repeating.insert(event.start(), event);
        }
    }

    /// Remove an event equal to `event`. Returns whether one was found.
    pub fn remove_event(&mut self, event: &Event) -> bool {
        if event.is_repeating() {
            match self.repeating.iter().position(|e| e == event) {
                Some(index) => {
                    self.repeating.remove(index);
                    true
                }
                None => false,
            }
        } else if self.non_repeating.get(&event.start()) == Some(event) {
            self.non_repeating.remove(&event.start());
            true
        } else {
            false
        }
    }

    /// Events taking place on the day beginning at `date`.
    pub fn events_on_day(&self, date: NaiveDateTime) -> Vec<&Event> {
        self.events_between(date, end_of(date, Field::Day))
    }

    /// High-priority (1-4) events of the month containing `date`.
    pub fn high_priority_events_in_month(&self, date: NaiveDateTime) -> Vec<&Event> {
        let range_start = start_of(date, Field::Month);
        let range_end = end_of(date, Field::Month);

        self.events_between(range_start, range_end)
            .into_iter()
            .filter(|event| event.is_high_priority())
            .collect()
    }

    /// Milliseconds spent per category on the month's high-priority events.
    pub fn category_durations_in_month(&self, date: NaiveDateTime) -> BTreeMap<String, i64> {
        let first_of_month = start_of(date, Field::Month);
        let mut durations = BTreeMap::new();

        for event in self.high_priority_events_in_month(date) {
            *durations.entry(event.category().to_string()).or_insert(0) +=
                event.duration_in_month(first_of_month);
        }

        durations
    }

    fn events_between(&self, range_start: NaiveDateTime, range_end: NaiveDateTime) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .non_repeating
            .range(range_start..range_end)
            .map(|(_, event)| event)
            .collect();

        events.extend(
            self.repeating
                .iter()
                .filter(|event| event.is_valid(range_start, range_end)),
        );

        events
    }

    pub fn find_by_uid(&self, uid: &str) -> Option<&Event> {
        self.events().find(|event| event.uid() == uid)
    }

    /// All events: one-offs by start, then repeating in insertion order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.non_repeating.values().chain(self.repeating.iter())
    }

    pub fn len(&self) -> usize {
        self.non_repeating.len() + self.repeating.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- ICS text ---

    pub fn from_ics(text: &str) -> TCalResult<Self> {
        let mut calendar = Calendar::new();
        calendar.merge_ics(text)?;
        Ok(calendar)
    }

    /// Add every event in `text`. Nothing is added if any of it fails to parse.
    pub fn merge_ics(&mut self, text: &str) -> TCalResult<usize> {
        let events = parse_calendar(text)?;
        let count = events.len();

        for event in events {
            self.add_event(event);
        }

        Ok(count)
    }

    pub fn to_ics(&self, config: &TCalConfig) -> String {
        generate_calendar(self.events(), config)
    }

    // --- Files ---

    /// Read a calendar file into a new store.
    pub fn load(path: impl AsRef<Path>) -> TCalResult<Self> {
        let mut calendar = Calendar::new();
        calendar.merge_load(path)?;
        Ok(calendar)
    }

    /// Add the events of another calendar file to this store.
    pub fn merge_load(&mut self, path: impl AsRef<Path>) -> TCalResult<usize> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let count = self.merge_ics(&text)?;

        tracing::debug!(path = %path.display(), count, "loaded events");
        Ok(count)
    }

    /// The file name `save` writes for `path`: `path` itself when it ends in
    /// `.ics`, otherwise `path` with `.ics` appended.
    pub fn resolve_path(path: impl AsRef<Path>) -> PathBuf {
        with_ics_extension(path.as_ref())
    }

    /// Write the store to `path`, adding `.ics` when the path lacks it.
    /// Returns the path written.
    pub fn save(&self, path: impl AsRef<Path>, config: &TCalConfig) -> TCalResult<PathBuf> {
        let path = Self::resolve_path(path);
        std::fs::write(&path, self.to_ics(config))?;

        tracing::debug!(path = %path.display(), count = self.len(), "saved calendar");
        Ok(path)
    }
}

fn with_ics_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ICS_EXTENSION));

    if has_extension {
        return path.to_path_buf();
    }

    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ICS_EXTENSION);
    let rewritten = PathBuf::from(name);

    tracing::warn!(
        from = %path.display(),
        to = %rewritten.display(),
        "calendar path lacks .ics extension"
    );
    rewritten
}
