//! Per-intent turn handlers.
//!
//! Each handler is a plain function over the calendar plus the turn's text;
//! the orchestrator owns dispatch. Handlers build user-facing messages and
//! report outcomes, but cross-turn pending state is threaded by the
//! orchestrator alone.

use chrono::{Duration, NaiveDateTime};
use slotwise_domain::business::{self, HoursViolation};
use slotwise_domain::constants::SUGGESTION_HORIZON_DAYS;
use slotwise_domain::{Appointment, ChatMessage, MessageTag};
use tracing::{debug, info};

use crate::calendar::CalendarStore;
use crate::dialogue::intent;
use crate::understand::phrases;

const WEEKDAY_NAMES: &[&str] =
    &["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

/// Outcome of the validate-then-add scheduling pipeline.
#[derive(Debug)]
pub(crate) enum ScheduleOutcome {
    /// Added to the calendar.
    Booked(Appointment),
    /// Business-hours rejection; the calendar is unchanged.
    Rejected(HoursViolation),
    /// Overlaps something already booked; the candidate is handed back for
    /// conflict resolution.
    Conflicted(Appointment),
}

/// Validate, check conflicts, and add - one atomic unit within the turn.
pub(crate) fn try_schedule(store: &mut CalendarStore, candidate: Appointment) -> ScheduleOutcome {
    if let Err(violation) = business::check_business_hours(&candidate) {
        debug!(title = %candidate.title, %violation, "candidate rejected by business hours");
        return ScheduleOutcome::Rejected(violation);
    }
    if !store.find_conflicts(&candidate).is_empty() {
        debug!(title = %candidate.title, "candidate conflicts with existing booking");
        return ScheduleOutcome::Conflicted(candidate);
    }

    info!(title = %candidate.title, start = %candidate.start, "appointment booked");
    store.add(candidate.clone());
    ScheduleOutcome::Booked(candidate)
}

/// Greeting reply; warmer when the user asked how we are.
pub(crate) fn handle_greeting(text: &str) -> ChatMessage {
    let content = if intent::is_how_are_you(text) {
        "I'm doing well, thank you for asking! How are you? Would you like to book, \
         reschedule, or cancel an appointment?"
    } else {
        "Hello! I'm your appointment assistant. You can ask me to book, reschedule, or \
         cancel appointments. How can I help?"
    };
    ChatMessage::assistant(MessageTag::Greeting, content)
}

/// Calendar summary reply.
pub(crate) fn handle_list(store: &CalendarStore) -> ChatMessage {
    if store.is_empty() {
        return ChatMessage::assistant(
            MessageTag::CalendarList,
            "You don't have any appointments yet. Say something like \"Book a meeting \
             tomorrow at 2pm\" to add one.",
        );
    }

    let mut lines = vec![format!("You have {} appointment(s):", store.len())];
    for appointment in store.appointments() {
        lines.push(appointment_line(appointment));
    }
    ChatMessage::assistant(MessageTag::CalendarList, lines.join("\n"))
}

pub(crate) fn handle_out_of_scope() -> ChatMessage {
    ChatMessage::assistant(
        MessageTag::OutOfScope,
        "I'm here only to help with appointments - booking, rescheduling, or cancelling. \
         I can't answer questions about weather, news, or other topics. Try something \
         like: \"Book a meeting tomorrow at 2pm\" or \"What do I have scheduled?\"",
    )
}

/// Locate the appointment the user is talking about.
///
/// Matches, in store order (ascending by start): title substring or word
/// overlap, then "today"/"tomorrow", then a weekday name matching the
/// appointment's weekday. First match wins; when several appointments match
/// equally well the earliest-starting one is chosen.
pub(crate) fn find_target(
    store: &CalendarStore,
    text: &str,
    now: NaiveDateTime,
) -> Option<Appointment> {
    let t = text.to_lowercase();
    let today = now.date();

    store
        .appointments()
        .iter()
        .find(|a| {
            let title = a.title.to_lowercase();
            if t.contains(&title) || title.split_whitespace().any(|word| t.contains(word)) {
                return true;
            }
            if t.contains("today") && a.start.date() == today {
                return true;
            }
            if t.contains("tomorrow") && a.start.date() == today + Duration::days(1) {
                return true;
            }
            WEEKDAY_NAMES
                .iter()
                .any(|day| t.contains(day) && weekday_name(a.start).eq_ignore_ascii_case(day))
        })
        .cloned()
}

/// Cancel flow: find the target and remove it.
pub(crate) fn handle_cancel(
    store: &mut CalendarStore,
    text: &str,
    now: NaiveDateTime,
) -> Vec<ChatMessage> {
    if store.is_empty() {
        return vec![ChatMessage::assistant(
            MessageTag::NotFound,
            "You don't have any appointments to cancel. Would you like to book one?",
        )];
    }

    let Some(target) = find_target(store, text, now) else {
        return vec![not_found_reply(store, "cancel")];
    };

    store.remove(&target.title, target.start);
    info!(title = %target.title, start = %target.start, "appointment cancelled");
    vec![ChatMessage::assistant(
        MessageTag::Cancelled,
        format!(
            "I've cancelled \"{}\" that was on {}.",
            target.title,
            target.start.format("%A %d %B at %H:%M")
        ),
    )]
}

/// Reschedule find-and-remove step.
///
/// Returns the replacement candidate for the scheduling pipeline once a new
/// time parses. The old appointment is only removed after the new time is
/// known, but before the new slot is validated: if validation then fails,
/// the old appointment is already gone.
pub(crate) fn handle_reschedule(
    store: &mut CalendarStore,
    text: &str,
    now: NaiveDateTime,
) -> (Vec<ChatMessage>, Option<Appointment>) {
    if store.is_empty() {
        return (
            vec![ChatMessage::assistant(
                MessageTag::NotFound,
                "You don't have any appointments yet, so there's nothing to reschedule. \
                 Would you like to book one?",
            )],
            None,
        );
    }

    let Some(existing) = find_target(store, text, now) else {
        return (vec![not_found_reply(store, "move")], None);
    };

    let Some(new_start) = phrases::parse_new_start(text, now) else {
        return (
            vec![ChatMessage::assistant(
                MessageTag::Clarification,
                "I couldn't understand the new time. Please say something like 'to 4pm' \
                 or 'at 2:30pm'.",
            )],
            None,
        );
    };

    let duration = existing.duration();
    store.remove(&existing.title, existing.start);
    info!(title = %existing.title, %new_start, "old slot removed for reschedule");

    let replacement = Appointment {
        title: existing.title.clone(),
        start: new_start,
        end: new_start + duration,
        location: existing.location.clone(),
        notes: existing.notes.clone().or_else(|| Some(text.to_string())),
    };

    let notice = ChatMessage::assistant(
        MessageTag::Rescheduling,
        format!(
            "I've removed the old slot. Checking if {} is free and booking it.",
            new_start.format("%Y-%m-%d %H:%M")
        ),
    );
    (vec![notice], Some(replacement))
}

/// Conflict resolution: propose the next free slot, never auto-book.
pub(crate) fn propose_alternative(
    store: &CalendarStore,
    candidate: &Appointment,
) -> (ChatMessage, Option<Appointment>) {
    match store.suggest_next_free_slot(candidate, SUGGESTION_HORIZON_DAYS) {
        Some(suggestion) => {
            let message = ChatMessage::assistant(
                MessageTag::AlternativeProposed,
                format!(
                    "I suggest moving it to {}. Does that time work for you? Reply yes to \
                     confirm or no to try another day.",
                    suggestion.start.format("%Y-%m-%d at %H:%M")
                ),
            );
            (message, Some(suggestion))
        }
        None => (
            ChatMessage::assistant(
                MessageTag::NoAlternative,
                "I couldn't find a free slot later that day. You may need to choose a \
                 different day.",
            ),
            None,
        ),
    }
}

/// Human-readable confirmation of the turn's final appointment, or a note
/// that nothing was scheduled.
pub(crate) fn notification(finalized: Option<&Appointment>) -> ChatMessage {
    match finalized {
        Some(appointment) => ChatMessage::assistant(
            MessageTag::Notification,
            format!(
                "Your appointment \"{}\" is booked on {} from {} to {}.",
                appointment.title,
                appointment.start.format("%A %d %B %Y"),
                appointment.start.format("%H:%M"),
                appointment.end.format("%H:%M")
            ),
        ),
        None => {
            ChatMessage::assistant(MessageTag::NothingScheduled, "No appointment was scheduled.")
        }
    }
}

fn not_found_reply(store: &CalendarStore, verb: &str) -> ChatMessage {
    let mut lines =
        vec!["I couldn't find that appointment. Your current appointments are:".to_string()];
    for appointment in store.appointments() {
        lines.push(appointment_line(appointment));
    }
    lines.push(format!(
        "Please mention the exact title or date of the one you want to {verb}."
    ));
    ChatMessage::assistant(MessageTag::NotFound, lines.join("\n"))
}

fn appointment_line(appointment: &Appointment) -> String {
    format!(
        "- {} - {} at {} to {}",
        appointment.title,
        appointment.start.format("%A %d %B"),
        appointment.start.format("%H:%M"),
        appointment.end.format("%H:%M")
    )
}

fn weekday_name(start: NaiveDateTime) -> &'static str {
    use chrono::Datelike;
    match start.date().weekday() {
        chrono::Weekday::Mon => "monday",
        chrono::Weekday::Tue => "tuesday",
        chrono::Weekday::Wed => "wednesday",
        chrono::Weekday::Thu => "thursday",
        chrono::Weekday::Fri => "friday",
        chrono::Weekday::Sat => "saturday",
        chrono::Weekday::Sun => "sunday",
    }
}
