//! Port interface for turning free text into structured requests.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use slotwise_domain::{AppointmentRequest, Result};

/// Trait for extracting a structured appointment request from user text.
///
/// `now` anchors relative dates ("today", "tomorrow", weekday names) so the
/// core never reads a wall clock. Returning `Ok(None)` means the text could
/// not be understood; the dialogue layer answers with a clarification
/// request and changes no state.
#[async_trait]
pub trait RequestUnderstanding: Send + Sync {
    /// Extract an appointment request from one user turn.
    async fn understand(
        &self,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AppointmentRequest>>;
}
