use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use slotwise_core::{CalendarStore, DialogueService, RequestUnderstanding, RuleBasedUnderstanding};
use slotwise_domain::{Appointment, AppointmentRequest, Result as DomainResult};

/// Understanding double that never extracts anything.
///
/// Drives the clarification path, which the rule-based implementation can
/// never reach on its own.
pub struct UnparseableUnderstanding;

#[async_trait]
impl RequestUnderstanding for UnparseableUnderstanding {
    async fn understand(
        &self,
        _text: &str,
        _now: NaiveDateTime,
    ) -> DomainResult<Option<AppointmentRequest>> {
        Ok(None)
    }
}

/// Service over the rule-based parser and an empty calendar.
pub fn service() -> DialogueService {
    DialogueService::new(Arc::new(RuleBasedUnderstanding))
}

/// Service seeded with an existing calendar.
pub fn service_with(store: CalendarStore) -> DialogueService {
    service().with_calendar(store)
}

/// Fixed "now": Tuesday 2026-03-03 at 11:00.
pub fn tuesday_now() -> NaiveDateTime {
    at(2026, 3, 3, 11, 0)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap()
}

/// Appointment fixture without location or notes.
pub fn appt(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> Appointment {
    Appointment::new(title, start, end)
}
