//! Line-oriented ICS parsing.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{TCalError, TCalResult};
use crate::event::{Event, Frequency, RecurrenceRule};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// Parse a whole calendar file into its events.
///
/// Stops at the first malformed line. Text after `END:VCALENDAR` is ignored,
/// and a file that ends before it is accepted. Only the line terminator is
/// stripped from property lines, so text values come back byte for byte.
pub fn parse_calendar(text: &str) -> TCalResult<Vec<Event>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines();

    match lines.by_ref().find(|line| !line.trim().is_empty()) {
        Some(header) if header.trim().eq_ignore_ascii_case("BEGIN:VCALENDAR") => {}
        _ => return Err(TCalError::corrupted("VCALENDAR header is missing")),
    }

    let mut events = Vec::new();

    while let Some(line) = lines.next() {
        let keyword = line.trim();
        if keyword.eq_ignore_ascii_case("END:VCALENDAR") {
            break;
        }

        if keyword.eq_ignore_ascii_case("BEGIN:VEVENT") {
            events.push(parse_event(&mut lines)?);
        } else if !keyword.is_empty() {
            tracing::trace!(line, "ignoring calendar property");
        }
    }

    Ok(events)
}

/// Properties collected from one VEVENT block.
#[derive(Default)]
struct EventFields {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    date_stamp: Option<NaiveDateTime>,
    uid: Option<String>,
    category: Option<String>,
    priority: Option<u8>,
    duration: Option<i64>,
    rule: Option<RecurrenceRule>,
}

fn parse_event<'a>(lines: &mut impl Iterator<Item = &'a str>) -> TCalResult<Event> {
    let mut fields = EventFields::default();

    loop {
        let Some(line) = lines.next() else {
            return Err(TCalError::corrupted("VEVENT is not terminated by END:VEVENT"));
        };

        if line.trim().eq_ignore_ascii_case("END:VEVENT") {
            break;
        }

        let (key, value) = split_property(line);

        match key.to_ascii_uppercase().as_str() {
            "BEGIN" => {
                return Err(TCalError::corrupted(format!(
                    "Nested component inside VEVENT: {line}"
                )));
            }
            "DTSTART" => fields.start = Some(parse_timestamp(require_value(key, value)?.trim())?),
            "DTSTAMP" => {
                fields.date_stamp = Some(parse_timestamp(require_value(key, value)?.trim())?);
            }
            "DTEND" => {
                if fields.duration.is_some() {
                    return Err(both_end_and_duration());
                }
                fields.end = Some(parse_timestamp(require_value(key, value)?.trim())?);
            }
            "DURATION" => {
                if fields.end.is_some() {
                    return Err(both_end_and_duration());
                }
                fields.duration = Some(parse_duration(require_value(key, value)?.trim())?);
            }
            "UID" => fields.uid = Some(parse_uid(line)?),
            "CATEGORIES" => fields.category = Some(require_value(key, value)?.to_string()),
            "PRIORITY" => fields.priority = Some(parse_priority(require_value(key, value)?)?),
            "RRULE" => fields.rule = Some(parse_rrule(require_value(key, value)?.trim())?),
            "" => {}
            _ => tracing::trace!(line, "ignoring event property"),
        }
    }

    build_event(fields)
}

fn build_event(fields: EventFields) -> TCalResult<Event> {
    let date_stamp = fields
        .date_stamp
        .ok_or_else(|| TCalError::corrupted("VEVENT is missing DTSTAMP"))?;
    let start = fields
        .start
        .ok_or_else(|| TCalError::corrupted("VEVENT is missing DTSTART"))?;
    let uid = fields
        .uid
        .ok_or_else(|| TCalError::corrupted("VEVENT is missing UID"))?;

    let end = match (fields.end, fields.duration) {
        (Some(end), _) => end,
        (None, Some(ms)) => Duration::try_milliseconds(ms)
            .and_then(|d| start.checked_add_signed(d))
            .ok_or_else(|| TCalError::corrupted("DURATION runs past the supported range"))?,
        (None, None) => start,
    };

    let mut event = Event::new(start, end).map_err(into_corrupted)?;
    event.set_uid(uid).map_err(into_corrupted)?;
    event.set_date_stamp(date_stamp);

    if let Some(category) = fields.category {
        event.set_category(category);
    }

    if let Some(priority) = fields.priority {
        event.set_priority(priority).map_err(into_corrupted)?;
    }

    if let Some(rule) = fields.rule {
        event.set_repeat(rule);
    }

    Ok(event)
}

/// Split `NAME;PARAM=x:value` into `NAME` and `value`.
fn split_property(line: &str) -> (&str, Option<&str>) {
    let (name, value) = match line.split_once(':') {
        Some((name, value)) => (name, Some(value)),
        None => (line, None),
    };

    let key = name.split(';').next().unwrap_or(name).trim();
    (key, value)
}

fn require_value<'a>(key: &str, value: Option<&'a str>) -> TCalResult<&'a str> {
    value.ok_or_else(|| TCalError::corrupted(format!("{key} has no value")))
}

fn both_end_and_duration() -> TCalError {
    TCalError::corrupted("VEVENT contains both DURATION and DTEND")
}

fn into_corrupted(err: TCalError) -> TCalError {
    match err {
        TCalError::InvalidEvent(reason) => TCalError::CorruptedFormat(reason),
        other => other,
    }
}

fn parse_uid(line: &str) -> TCalResult<String> {
    let mut parts = line.split(':');
    let _key = parts.next();

    match (parts.next(), parts.next()) {
        (Some(value), None) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(TCalError::corrupted(format!("Malformed UID line: {line}"))),
    }
}

fn parse_priority(value: &str) -> TCalResult<u8> {
    let priority: u8 = value
        .trim()
        .parse()
        .map_err(|_| TCalError::corrupted(format!("PRIORITY is not a number: {value}")))?;

    if priority > crate::event::MAX_PRIORITY {
        return Err(TCalError::corrupted(format!(
            "PRIORITY {priority} is outside 0-{}",
            crate::event::MAX_PRIORITY
        )));
    }

    Ok(priority)
}

/// Parse the `FREQ`, `INTERVAL` and `UNTIL` parts of an RRULE value.
fn parse_rrule(value: &str) -> TCalResult<RecurrenceRule> {
    let mut frequency = None;
    let mut interval = 1;
    let mut until = None;

    for part in value.split(';') {
        let Some((name, part_value)) = part.split_once('=') else {
            continue;
        };

        match name.trim().to_ascii_uppercase().as_str() {
            "FREQ" => {
                frequency = Some(Frequency::from_ics_str(part_value).ok_or_else(|| {
                    TCalError::corrupted(format!("Unsupported RRULE frequency: {part_value}"))
                })?);
            }
            "INTERVAL" => interval = parse_interval(part_value)?,
            "UNTIL" => until = Some(parse_timestamp(part_value)?),
            _ => tracing::trace!(part, "ignoring RRULE part"),
        }
    }

    let frequency =
        frequency.ok_or_else(|| TCalError::corrupted(format!("RRULE without FREQ=: {value}")))?;

    RecurrenceRule::new(frequency, interval, until).map_err(into_corrupted)
}

fn parse_interval(value: &str) -> TCalResult<u32> {
    let invalid = || TCalError::corrupted(format!("Invalid RRULE INTERVAL: {value}"));

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(interval) => Ok(interval),
    }
}

/// Parse `yyyymmdd` or `yyyymmddThhmmss`.
pub fn parse_timestamp(value: &str) -> TCalResult<NaiveDateTime> {
    let invalid = || TCalError::corrupted(format!("Invalid timestamp: {value}"));

    if !value.is_ascii() {
        return Err(invalid());
    }

    let (date, time) = match value.len() {
        8 => (value, None),
        15 if value.as_bytes()[8].eq_ignore_ascii_case(&b'T') => {
            (&value[..8], Some(&value[9..]))
        }
        _ => return Err(invalid()),
    };

    let number = |digits: &str| -> TCalResult<u32> {
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.parse().map_err(|_| invalid())
    };

    let year = number(&date[..4])?;
    let month = number(&date[4..6])?;
    let day = number(&date[6..8])?;

    let date = i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(invalid)?;

    let (hour, minute, second) = match time {
        Some(time) => (
            number(&time[..2])?,
            number(&time[2..4])?,
            number(&time[4..6])?,
        ),
        None => (0, 0, 0),
    };

    date.and_hms_opt(hour, minute, second).ok_or_else(invalid)
}

/// Parse a `P…` duration into milliseconds.
///
/// Accepts one or more tokens of one or two digits followed by W, D, H, M or
/// S, e.g. `P1W2D` or `P2H30M`.
pub fn parse_duration(value: &str) -> TCalResult<i64> {
    let invalid = || TCalError::corrupted(format!("Invalid DURATION: {value}"));

    let body = value.strip_prefix(['P', 'p']).ok_or_else(invalid)?;

    let mut total = 0;
    let mut tokens = 0;
    let mut amount: i64 = 0;
    let mut digits = 0;

    for c in body.chars() {
        if let Some(digit) = c.to_digit(10) {
            digits += 1;
            if digits > 2 {
                return Err(invalid());
            }
            amount = amount * 10 + i64::from(digit);
            continue;
        }

        let unit = match c.to_ascii_uppercase() {
            'W' => MS_PER_WEEK,
            'D' => MS_PER_DAY,
            'H' => MS_PER_HOUR,
            'M' => MS_PER_MINUTE,
            'S' => MS_PER_SECOND,
            _ => return Err(invalid()),
        };

        if digits == 0 {
            return Err(invalid());
        }

        total += amount * unit;
        tokens += 1;
        amount = 0;
        digits = 0;
    }

    // trailing digits without a unit
    if tokens == 0 || digits > 0 {
        return Err(invalid());
    }

    Ok(total)
}
