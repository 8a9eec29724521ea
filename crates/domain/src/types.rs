//! Common data types used throughout the application

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A booked entry on the calendar.
///
/// Identity for removal purposes is the (title, start) pair; appointments
/// carry no separate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl Appointment {
    /// Create an appointment without location or notes.
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { title: title.into(), start, end, location: None, notes: None }
    }

    /// Half-open interval overlap test: `max(s1, s2) < min(e1, e2)`.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Appointment length.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Structured appointment request produced by the text-understanding layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// True when only a calendar date was specified, no explicit clock time.
    /// The orchestrator must offer slots instead of booking directly.
    pub date_only: bool,
}

impl AppointmentRequest {
    /// Convert into a bookable appointment, carrying location and notes over.
    pub fn to_appointment(&self) -> Appointment {
        Appointment {
            title: self.title.clone(),
            start: self.start,
            end: self.end,
            location: self.location.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// An open menu of candidate start times awaiting the user's choice.
///
/// Alive only between the turn the slot menu was shown and the next turn
/// where the user names a clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotOffer {
    pub title: String,
    pub date: NaiveDate,
    pub duration_minutes: i64,
}

/// Message author shown in the conversation transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// Machine-readable tag attached to each transcript message.
///
/// Presentation layers key rendering decisions off the tag; tests assert on
/// it instead of matching message prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageTag {
    UserInput,
    Greeting,
    CalendarList,
    OutOfScope,
    Clarification,
    HoursRejected,
    Rescheduling,
    Conflict,
    AlternativeProposed,
    NoAlternative,
    Declined,
    SlotsOffered,
    NoSlots,
    SlotRejected,
    Booked,
    Cancelled,
    NotFound,
    Notification,
    NothingScheduled,
}

/// One entry in the per-turn conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
    pub tag: MessageTag,
}

impl ChatMessage {
    /// The user's own input, echoed into the transcript.
    pub fn user(content: impl Into<String>) -> Self {
        Self { sender: Sender::User, content: content.into(), tag: MessageTag::UserInput }
    }

    /// An assistant reply with the given tag.
    pub fn assistant(tag: MessageTag, content: impl Into<String>) -> Self {
        Self { sender: Sender::Assistant, content: content.into(), tag }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap()
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Appointment::new("a", at(9, 0), at(10, 0));
        let b = Appointment::new("b", at(9, 30), at(10, 30));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = Appointment::new("a", at(9, 0), at(10, 0));
        let b = Appointment::new("b", at(10, 0), at(11, 0));

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn contained_interval_overlaps() {
        let outer = Appointment::new("outer", at(9, 0), at(12, 0));
        let inner = Appointment::new("inner", at(10, 0), at(10, 30));

        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn request_round_trips_into_appointment() {
        let request = AppointmentRequest {
            title: "dentist appointment".to_string(),
            start: at(15, 0),
            end: at(16, 0),
            duration_minutes: 60,
            location: Some("downtown clinic".to_string()),
            notes: Some("bring insurance card".to_string()),
            date_only: false,
        };

        let appointment = request.to_appointment();
        assert_eq!(appointment.title, "dentist appointment");
        assert_eq!(appointment.duration(), Duration::minutes(60));
        assert_eq!(appointment.location.as_deref(), Some("downtown clinic"));
    }
}
