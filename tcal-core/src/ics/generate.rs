//! ICS file generation.

use crate::config::TCalConfig;
use crate::event::EventLike;

use super::format_timestamp;

/// Serialize events into a complete VCALENDAR document with CRLF line endings.
pub fn generate_calendar<'a, E, I>(events: I, config: &TCalConfig) -> String
where
    E: EventLike + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut out = String::new();

    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, &format!("PRODID:{}", config.product_id));
    push_line(&mut out, "VERSION:2.0");

    for event in events {
        push_event(&mut out, event);
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn push_event<E: EventLike>(out: &mut String, event: &E) {
    push_line(out, "BEGIN:VEVENT");
    push_line(out, &format!("DTSTAMP:{}", format_timestamp(event.date_stamp())));
    push_line(out, &format!("UID:{}", event.uid()));
    push_line(out, &format!("DTSTART:{}", format_timestamp(event.start())));
    push_line(out, &format!("DTEND:{}", format_timestamp(event.end())));
    push_line(out, &format!("CATEGORIES:{}", event.category()));

    // 0 means undefined
    if event.priority() > 0 {
        push_line(out, &format!("PRIORITY:{}", event.priority()));
    }

    if let Some(rule) = event.recurrence() {
        let mut rrule = format!("RRULE:FREQ={}", rule.frequency().as_ics_str());
        if rule.interval() != 1 {
            rrule.push_str(&format!(";INTERVAL={}", rule.interval()));
        }
        if let Some(until) = event.expiration() {
            rrule.push_str(&format!(";UNTIL={}", format_timestamp(until)));
        }
        push_line(out, &rrule);
    }

    push_line(out, "END:VEVENT");
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}
