//! Short time-phrase parsing.
//!
//! Helpers for the two follow-up situations where the user names just a
//! clock time: choosing from an offered slot menu ("2pm", "14:00") and
//! giving a reschedule target ("to 4pm", "at 2:30", "for 10am").

use chrono::{Duration, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})(?::(\d{2}))?\s*(am|pm)?")
        .expect("CLOCK_TIME should compile - this is a bug")
});

// Reschedule targets, tried in priority order: "to X", then "at X", then
// "for X".
static TO_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bto\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)?")
        .expect("TO_TIME should compile - this is a bug")
});
static AT_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bat\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)?")
        .expect("AT_TIME should compile - this is a bug")
});
static FOR_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfor\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)?")
        .expect("FOR_TIME should compile - this is a bug")
});

/// Fold an am/pm marker into a 24h hour.
pub(crate) fn apply_meridiem(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    }
}

fn time_from_captures(caps: &regex::Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem = caps.get(3).map(|m| m.as_str());
    // Out-of-range values fall out here instead of wrapping.
    NaiveTime::from_hms_opt(apply_meridiem(hour, meridiem), minute, 0)
}

/// Parse a bare clock time from a short reply like "2pm", "10:30 am" or
/// "14:00".
///
/// The pattern is searched anywhere in the text, so "let's do 2pm then"
/// also resolves. Returns `None` when no digits are present or the value is
/// out of range.
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    let t = text.trim().to_lowercase();
    let caps = CLOCK_TIME.captures(&t)?;
    time_from_captures(&caps)
}

/// Parse a reschedule target from phrases like "to 4pm", "at 2:30" or
/// "for 10am", in that priority order.
///
/// The date defaults to `now`'s date; saying "tomorrow" anywhere in the
/// text shifts it one day forward.
pub fn parse_new_start(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let t = text.to_lowercase();

    for pattern in [&*TO_TIME, &*AT_TIME, &*FOR_TIME] {
        if let Some(caps) = pattern.captures(&t) {
            let time = time_from_captures(&caps)?;
            let mut date = now.date();
            if t.contains("tomorrow") {
                date += Duration::days(1);
            }
            return Some(date.and_time(time));
        }
    }

    None
}
