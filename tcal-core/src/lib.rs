//! Calendar engine for tcal.
//!
//! This crate holds everything below the command line:
//! - `field` calendar-field arithmetic on `NaiveDateTime`
//! - `event` the event model and its recurrence logic
//! - `calendar` the in-memory store and its file boundary
//! - `ics` the iCalendar subset tcal reads and writes

pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod field;
pub mod ics;

pub use calendar::Calendar;
pub use config::TCalConfig;
pub use error::{TCalError, TCalResult};
pub use event::{Event, EventLike, Frequency, RecurrenceRule};
pub use field::Field;
