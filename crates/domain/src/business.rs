//! Business-hours validator.
//!
//! Pure interval checks against the scheduling policy: weekdays only, no
//! holidays, 08:00-17:00, last start 16:30, lunch closed 13:00-14:00. Rules
//! are evaluated in a fixed order so rejection messages are deterministic,
//! and the same function filters generated candidate slots.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use thiserror::Error;

use crate::constants::{
    CLOSE_HOUR, HOLIDAYS, LAST_START_HOUR, LAST_START_MINUTE, LUNCH_END_HOUR, LUNCH_START_HOUR,
    OPEN_HOUR,
};
use crate::types::Appointment;

/// Why an appointment failed business-hours validation.
///
/// `Display` strings are the exact user-facing rejection messages.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursViolation {
    #[error("We only schedule on weekdays (Monday-Friday), not on weekends.")]
    Weekend,

    #[error("We're closed on holidays. Please choose a different day.")]
    Holiday,

    #[error("We open at 8:00 AM. Please choose a time from 8am onward.")]
    BeforeOpening,

    #[error("We close at 5:00 PM. Your appointment must end by 5pm.")]
    PastClosing,

    #[error("The latest appointment start is 4:30 PM. Please choose an earlier time.")]
    LateStart,

    #[error("We're closed for lunch between 1:00 PM and 2:00 PM. Please pick a time outside that hour.")]
    DuringLunch,
}

// Hour/minute constants are always in range; fall back to midnight rather
// than panic.
fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Opening time (08:00).
pub fn work_start() -> NaiveTime {
    hm(OPEN_HOUR, 0)
}

/// Closing time (17:00).
pub fn work_end() -> NaiveTime {
    hm(CLOSE_HOUR, 0)
}

/// Latest permissible start time (16:30).
pub fn last_start() -> NaiveTime {
    hm(LAST_START_HOUR, LAST_START_MINUTE)
}

/// Start of the lunch break (13:00).
pub fn lunch_start() -> NaiveTime {
    hm(LUNCH_START_HOUR, 0)
}

/// End of the lunch break (14:00, exclusive).
pub fn lunch_end() -> NaiveTime {
    hm(LUNCH_END_HOUR, 0)
}

/// Monday through Friday.
pub fn is_weekday(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Annual holiday check on (month, day) only.
pub fn is_holiday(day: NaiveDate) -> bool {
    HOLIDAYS.iter().any(|&(month, dom)| day.month() == month && day.day() == dom)
}

/// Validate an appointment against the business-hours policy.
///
/// Rules run in a fixed order and the first failure wins: weekday, holiday,
/// opening time, closing time, last start, lunch break. The lunch check uses
/// the half-open intersection test `start < lunch_end && end > lunch_start`.
pub fn check_business_hours(appointment: &Appointment) -> Result<(), HoursViolation> {
    let day = appointment.start.date();

    if !is_weekday(day) {
        return Err(HoursViolation::Weekend);
    }

    if is_holiday(day) {
        return Err(HoursViolation::Holiday);
    }

    let start = appointment.start.time();
    let end = appointment.end.time();

    if start < work_start() {
        return Err(HoursViolation::BeforeOpening);
    }

    if end > work_end() {
        return Err(HoursViolation::PastClosing);
    }

    if start > last_start() {
        return Err(HoursViolation::LateStart);
    }

    if start < lunch_end() && end > lunch_start() {
        return Err(HoursViolation::DuringLunch);
    }

    Ok(())
}

/// One-line summary of the scheduling policy, appended to rejections.
pub fn business_hours_summary() -> &'static str {
    "We're open Monday-Friday, 8am-5pm (last start 4:30pm), and closed for lunch 1-2pm."
}
