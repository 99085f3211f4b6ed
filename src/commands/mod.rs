pub mod day;
pub mod delete;
pub mod export;
pub mod import;
pub mod month;
pub mod new;
pub mod week;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tcal_core::{Calendar, TCalConfig};

/// The calendar a command works on, loaded once per invocation.
pub struct CalendarContext {
    pub config: TCalConfig,
    pub path: PathBuf,
    pub calendar: Calendar,
}

impl CalendarContext {
    /// Load the user's config and the calendar file (`file` overrides the
    /// configured one).
    pub fn load(file: Option<PathBuf>) -> Result<Self> {
        let config = TCalConfig::load().context("Could not load tcal config")?;
        Self::open(config, file)
    }

    /// A calendar file that doesn't exist yet opens as an empty calendar.
    /// The path is read under the same `.ics` name that saving writes.
    pub fn open(config: TCalConfig, file: Option<PathBuf>) -> Result<Self> {
        let path = Calendar::resolve_path(file.unwrap_or_else(|| config.calendar_path()));

        let calendar = if path.exists() {
            Calendar::load(&path)
                .with_context(|| format!("Could not read calendar {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "calendar file missing, starting empty");
            Calendar::new()
        };

        Ok(Self {
            config,
            path,
            calendar,
        })
    }

    /// Write the calendar back to the file it came from.
    pub fn save(&self) -> Result<PathBuf> {
        self.calendar
            .save(&self.path, &self.config)
            .with_context(|| format!("Could not write calendar {}", self.path.display()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use tcal_core::Event;

    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    pub fn meeting() -> Event {
        let mut event = Event::new(at(2011, 3, 30, 13, 0), at(2011, 3, 30, 15, 0)).unwrap();
        event.set_uid("meeting@test").unwrap();
        event.set_category("Meeting");
        event.set_priority(1).unwrap();
        event
    }

    pub fn context_in_file(dir: &tempfile::TempDir, name: &str) -> CalendarContext {
        CalendarContext::open(TCalConfig::default(), Some(dir.path().join(name))).unwrap()
    }

    /// A context backed by `calendar.ics` inside `dir`.
    pub fn context_in(dir: &tempfile::TempDir) -> CalendarContext {
        context_in_file(dir, "calendar.ics")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        assert!(ctx.calendar.is_empty());
        assert!(!ctx.path.exists());
    }

    #[test]
    fn saved_context_reopens_with_its_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(&dir);
        ctx.calendar.add_event(meeting());

        let written = ctx.save().unwrap();
        assert_eq!(written, ctx.path);

        let reopened = context_in(&dir);
        assert_eq!(reopened.calendar.len(), 1);
        assert!(reopened.calendar.find_by_uid("meeting@test").is_some());
    }

    #[test]
    fn extensionless_path_reopens_what_was_saved() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");

        let mut ctx = CalendarContext::open(TCalConfig::default(), Some(work.clone())).unwrap();
        assert_eq!(ctx.path, dir.path().join("work.ics"));
        ctx.calendar.add_event(meeting());
        ctx.save().unwrap();

        let reopened = CalendarContext::open(TCalConfig::default(), Some(work)).unwrap();
        assert_eq!(reopened.calendar.len(), 1);

        // a second save keeps the earlier event
        let mut again = reopened;
        let mut lunch = meeting();
        lunch.set_new_start_end(at(2011, 3, 31, 12, 0), at(2011, 3, 31, 13, 0)).unwrap();
        again.calendar.add_event(lunch);
        again.save().unwrap();
        assert_eq!(context_in_file(&dir, "work").calendar.len(), 2);
    }

    #[test]
    fn corrupted_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("calendar.ics"), "BEGIN:VCALENDA\r\n").unwrap();

        let err = CalendarContext::open(
            TCalConfig::default(),
            Some(dir.path().join("calendar.ics")),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("calendar.ics"));
    }
}
