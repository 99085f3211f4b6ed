//! Parsing of typed dates and times, and duration presentation.

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Parse a date typed as `ddmm`, `ddmmyy`, `ddmmyyyy`, `dd.mm.yy` or
/// `dd.mm.yyyy`. Missing century or year is taken from `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    let digits: String = match input.split('.').collect::<Vec<_>>().as_slice() {
        [day, month, year] if day.len() == 2 && month.len() == 2 && year.len() >= 2 => {
            format!("{day}{month}{year}")
        }
        [_] => input.to_string(),
        _ => bail!("Unrecognized date '{}' (use ddmm, ddmmyy, ddmmyyyy or dd.mm.yyyy)", input),
    };

    if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        bail!("Unrecognized date '{}' (use ddmm, ddmmyy, ddmmyyyy or dd.mm.yyyy)", input);
    }

    let day: u32 = digits[..2].parse()?;
    let month: u32 = digits[2..4].parse()?;
    let year = match digits.len() {
        4 => today.year(),
        6 => today.year() / 100 * 100 + digits[4..].parse::<i32>()?,
        5 | 7 => bail!("Unrecognized year in '{}'", input),
        _ => digits[4..].parse()?,
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow::anyhow!("{:02}.{:02}.{} is not a date", day, month, year))
}

/// Parse a time typed as `h`, `hh`, `hhmm` or `hh:mm`.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    if !input.is_ascii() {
        bail!("Unrecognized time '{}' (use h, hh, hhmm or hh:mm)", input);
    }

    let (hour, minute) = match (input.len(), input.split_once(':')) {
        (1 | 2, None) => (input, "0"),
        (4, None) => input.split_at(2),
        (5, Some((hour, minute))) if hour.len() == 2 => (hour, minute),
        _ => bail!("Unrecognized time '{}' (use h, hh, hhmm or hh:mm)", input),
    };

    let parse = |part: &str| -> Result<u32> {
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            bail!("Unrecognized time '{}'", input);
        }
        Ok(part.parse()?)
    };

    NaiveTime::from_hms_opt(parse(hour)?, parse(minute)?, 0)
        .ok_or_else(|| anyhow::anyhow!("{} is not a time of day", input))
}

/// Present a millisecond duration as days, hours and minutes, e.g. `1d 2h 30m`.
/// Anything under a minute is dropped.
pub fn present_duration(ms: i64) -> String {
    let total_minutes = ms.max(0) / 60_000;
    let days = total_minutes / (24 * 60);
    let hours = total_minutes % (24 * 60) / 60;
    let minutes = total_minutes % 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m")]
        .into_iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{amount}{unit}"))
        .collect();

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 3, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- dates ---

    #[test]
    fn date_forms() {
        assert_eq!(parse_date("3003", today()).unwrap(), date(2011, 3, 30));
        assert_eq!(parse_date("300312", today()).unwrap(), date(2012, 3, 30));
        assert_eq!(parse_date("30032012", today()).unwrap(), date(2012, 3, 30));
        assert_eq!(parse_date("30.03.2012", today()).unwrap(), date(2012, 3, 30));
        assert_eq!(parse_date("30.03.12", today()).unwrap(), date(2012, 3, 30));
    }

    #[test]
    fn year_under_ten_keeps_century() {
        let today = date(2005, 6, 1);
        assert_eq!(parse_date("0101", today).unwrap(), date(2005, 1, 1));
        assert_eq!(parse_date("010109", today).unwrap(), date(2009, 1, 1));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(parse_date("3002", today()).is_err());
        assert!(parse_date("29022011", today()).is_err());
        assert!(parse_date("29022012", today()).is_ok());
        assert!(parse_date("0013", today()).is_err());
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for input in ["", "30", "30a3", "3003201", "30.3.2011", "30-03-2011", "30.03"] {
            assert!(parse_date(input, today()).is_err(), "{input}");
        }
    }

    // --- times ---

    #[test]
    fn time_forms() {
        let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_time("9").unwrap(), time(9, 0));
        assert_eq!(parse_time("13").unwrap(), time(13, 0));
        assert_eq!(parse_time("1330").unwrap(), time(13, 30));
        assert_eq!(parse_time("13:30").unwrap(), time(13, 30));
    }

    #[test]
    fn bad_times_are_rejected() {
        for input in ["", "24", "1360", "133", "1:30", "ab", "13.30"] {
            assert!(parse_time(input).is_err(), "{input}");
        }
    }

    // --- durations ---

    #[test]
    fn present_duration_parts() {
        let minute = 60_000;
        let hour = 60 * minute;
        assert_eq!(present_duration(2 * hour), "2h");
        assert_eq!(present_duration(26 * hour + 30 * minute), "1d 2h 30m");
        assert_eq!(present_duration(24 * hour), "1d");
        assert_eq!(present_duration(45 * minute + 59_999), "45m");
        assert_eq!(present_duration(30_000), "0m");
    }
}
