//! Rule-based request understanding.
//!
//! A small deterministic parser: clock times ("3pm", "15:30", "at 3"),
//! relative and absolute dates (today/tomorrow, weekday names, "july 4th",
//! slash dates), durations, and a title heuristic. Good enough to drive the
//! dialogue without any model in the loop, and fully reproducible given the
//! injected `now`.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use slotwise_domain::constants::DEFAULT_DURATION_MINUTES;
use slotwise_domain::{AppointmentRequest, Result};

use crate::understand::phrases::apply_meridiem;
use crate::understand::ports::RequestUnderstanding;

// Any explicit clock time in the message; used for date-only detection.
static EXPLICIT_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,2}\s*(am|pm)\b|at\s+\d{1,2}\b|\d{1,2}:\d{2}")
        .expect("EXPLICIT_TIME should compile - this is a bug")
});

// Time forms in priority order. The meridiem/colon requirement keeps "4th"
// in "july 4th" from being read as a time.
static MERIDIEM_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b")
        .expect("MERIDIEM_TIME should compile - this is a bug")
});
static COLON_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("COLON_TIME should compile - this is a bug")
});
static AT_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bat\s+(\d{1,2})\b").expect("AT_HOUR should compile - this is a bug"));

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2})(?:st|nd|rd|th)?\b",
    )
    .expect("MONTH_DAY should compile - this is a bug")
});
static SLASH_DATE_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b")
        .expect("SLASH_DATE_FULL should compile - this is a bug")
});
static SLASH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").expect("SLASH_DATE should compile - this is a bug")
});

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s*(minute|minutes|min|hour|hours)")
        .expect("DURATION should compile - this is a bug")
});
static TITLE_FOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"for ([a-zA-Z ]+)").expect("TITLE_FOR should compile - this is a bug"));

const WEEKDAY_NAMES: &[&str] =
    &["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

const MONTH_NAMES: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Rule-based implementation of the understanding port.
#[derive(Debug, Default)]
pub struct RuleBasedUnderstanding;

#[async_trait]
impl RequestUnderstanding for RuleBasedUnderstanding {
    async fn understand(
        &self,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AppointmentRequest>> {
        Ok(parse_request(text, now))
    }
}

/// Parse one user turn into a structured appointment request.
///
/// Defaults: 09:00 when no time is given, `now`'s date when no date is
/// given, 30 minutes when no duration is given, title "appointment" when
/// nothing better is found. `date_only` is set when a date keyword was
/// present but no explicit clock time.
pub fn parse_request(text: &str, now: NaiveDateTime) -> Option<AppointmentRequest> {
    let t = text.to_lowercase();

    let has_explicit_time = EXPLICIT_TIME.is_match(&t);
    let (hour, minute) = parse_time_of_day(&t).unwrap_or((9, 0));
    let (date, has_date_keyword) = parse_date(&t, now);

    let duration_minutes = parse_duration_minutes(&t).unwrap_or(DEFAULT_DURATION_MINUTES);
    let title = parse_title(&t);

    let start = date.and_hms_opt(hour, minute, 0)?;
    let end = start + Duration::minutes(duration_minutes);

    Some(AppointmentRequest {
        title,
        start,
        end,
        duration_minutes,
        location: None,
        notes: Some(text.to_string()),
        date_only: has_date_keyword && !has_explicit_time,
    })
}

fn parse_time_of_day(t: &str) -> Option<(u32, u32)> {
    if let Some(caps) = MERIDIEM_TIME.captures(t) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let meridiem = caps.get(3).map(|m| m.as_str());
        return Some((apply_meridiem(hour, meridiem), minute));
    }

    if let Some(caps) = COLON_TIME.captures(t) {
        return Some((caps.get(1)?.as_str().parse().ok()?, caps.get(2)?.as_str().parse().ok()?));
    }

    if let Some(caps) = AT_HOUR.captures(t) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        // Bare "at 3" reads as 3pm, "at 9" as 9am.
        return Some((if hour < 8 { hour + 12 } else { hour }, 0));
    }

    None
}

fn parse_date(t: &str, now: NaiveDateTime) -> (NaiveDate, bool) {
    let today = now.date();

    if t.contains("tomorrow") {
        return (today + Duration::days(1), true);
    }
    if t.contains("today") {
        return (today, true);
    }

    // Weekday names resolve to the next occurrence; naming today's weekday
    // means next week.
    for (index, name) in WEEKDAY_NAMES.iter().enumerate() {
        if t.contains(name) {
            let today_index = i64::from(today.weekday().num_days_from_monday());
            let mut days_ahead = (index as i64 - today_index).rem_euclid(7);
            if days_ahead == 0 {
                days_ahead = 7;
            }
            return (today + Duration::days(days_ahead), true);
        }
    }

    if let Some(caps) = MONTH_DAY.captures(t) {
        let month = caps
            .get(1)
            .and_then(|m| MONTH_NAMES.iter().position(|name| *name == m.as_str()))
            .map(|index| index as u32 + 1);
        let day = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        if let (Some(month), Some(day)) = (month, day) {
            let mut year = today.year();
            if month < today.month() || (month == today.month() && day < today.day()) {
                year += 1;
            }
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return (date, true);
            }
        }
    }

    if let Some(caps) = SLASH_DATE_FULL.captures(t) {
        let parsed = slash_parts(&caps).and_then(|(first, second)| {
            let year: i32 = caps.get(3)?.as_str().parse().ok()?;
            let (month, day) = month_day_order(first, second);
            if month <= 12 && (1..=31).contains(&day) {
                NaiveDate::from_ymd_opt(year, month, day)
            } else {
                None
            }
        });
        if let Some(date) = parsed {
            return (date, true);
        }
    }

    if let Some(caps) = SLASH_DATE.captures(t) {
        let parsed = slash_parts(&caps).and_then(|(first, second)| {
            let (month, day) = month_day_order(first, second);
            if month <= 12 && (1..=31).contains(&day) {
                let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
                if date < today {
                    // Next year; Feb 29 may not exist there.
                    NaiveDate::from_ymd_opt(today.year() + 1, month, day)
                } else {
                    Some(date)
                }
            } else {
                None
            }
        });
        if let Some(date) = parsed {
            return (date, true);
        }
    }

    (today, false)
}

fn slash_parts(caps: &regex::Captures<'_>) -> Option<(u32, u32)> {
    let first: u32 = caps.get(1)?.as_str().parse().ok()?;
    let second: u32 = caps.get(2)?.as_str().parse().ok()?;
    Some((first, second))
}

// "3/15" is month/day; "15/3" flips when the first number cannot be a
// month.
fn month_day_order(first: u32, second: u32) -> (u32, u32) {
    if first <= 12 && second <= 31 {
        (first, second)
    } else if second <= 12 && first <= 31 {
        (second, first)
    } else {
        (first, second)
    }
}

fn parse_duration_minutes(t: &str) -> Option<i64> {
    let caps = DURATION.captures(t)?;
    let value: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();
    Some(if unit.contains("hour") { value * 60 } else { value })
}

fn parse_title(t: &str) -> String {
    if let Some(caps) = TITLE_FOR.captures(t) {
        if let Some(m) = caps.get(1) {
            return m.as_str().trim().to_string();
        }
    }
    if t.contains("doctor") {
        return "doctor visit".to_string();
    }
    if t.contains("dentist") {
        return "dentist appointment".to_string();
    }
    "appointment".to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    // 2026-03-03 is a Tuesday.
    fn tuesday_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 3).unwrap().and_hms_opt(11, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dentist_tomorrow_with_time_and_duration() {
        let request =
            parse_request("Book a dentist appointment tomorrow at 3pm for 1 hour", tuesday_now())
                .unwrap();

        assert_eq!(request.title, "dentist appointment");
        assert_eq!(request.start, date(2026, 3, 4).and_hms_opt(15, 0, 0).unwrap());
        assert_eq!(request.end, date(2026, 3, 4).and_hms_opt(16, 0, 0).unwrap());
        assert_eq!(request.duration_minutes, 60);
        assert!(!request.date_only);
    }

    #[test]
    fn date_keyword_without_time_is_date_only() {
        let request = parse_request("Book a meeting next monday", tuesday_now()).unwrap();

        assert!(request.date_only);
        assert_eq!(request.start.date(), date(2026, 3, 9));
        assert_eq!(request.duration_minutes, 30);
        assert_eq!(request.title, "appointment");
    }

    #[test]
    fn naming_todays_weekday_means_next_week() {
        let request = parse_request("Book something on tuesday", tuesday_now()).unwrap();
        assert_eq!(request.start.date(), date(2026, 3, 10));
    }

    #[test]
    fn bare_at_hour_uses_afternoon_heuristic() {
        let afternoon = parse_request("meet me today at 3", tuesday_now()).unwrap();
        assert_eq!(afternoon.start.time().hour(), 15);
        assert!(!afternoon.date_only);

        let morning = parse_request("meet me today at 9", tuesday_now()).unwrap();
        assert_eq!(morning.start.time().hour(), 9);
    }

    #[test]
    fn month_name_dates_roll_into_next_year() {
        let ahead = parse_request("book a checkup on july 4th", tuesday_now()).unwrap();
        assert_eq!(ahead.start.date(), date(2026, 7, 4));

        let behind = parse_request("book a checkup on january 15", tuesday_now()).unwrap();
        assert_eq!(behind.start.date(), date(2027, 1, 15));
    }

    #[test]
    fn slash_dates_disambiguate_and_roll_over() {
        let explicit = parse_request("book it 12/31/2026 at 10am", tuesday_now()).unwrap();
        assert_eq!(explicit.start.date(), date(2026, 12, 31));

        let past = parse_request("book it on 1/15", tuesday_now()).unwrap();
        assert_eq!(past.start.date(), date(2027, 1, 15));

        let flipped = parse_request("book it on 15/3", tuesday_now()).unwrap();
        assert_eq!(flipped.start.date(), date(2026, 3, 15));
    }

    #[test]
    fn title_for_capture_beats_keywords() {
        let request =
            parse_request("book a slot for project review tomorrow at 2pm", tuesday_now()).unwrap();
        assert_eq!(request.title, "project review tomorrow at");
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let request = parse_request("book an appointment", tuesday_now()).unwrap();

        assert_eq!(request.start, tuesday_now().date().and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(request.duration_minutes, 30);
        assert_eq!(request.title, "appointment");
        assert!(!request.date_only);
        assert_eq!(request.notes.as_deref(), Some("book an appointment"));
    }

    #[test]
    fn minutes_duration_is_taken_literally() {
        let request = parse_request("book a call today at 10am for 45 minutes", tuesday_now())
            .unwrap();
        assert_eq!(request.duration_minutes, 45);
    }
}
