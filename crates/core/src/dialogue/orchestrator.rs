//! Dialogue orchestration.
//!
//! One call processes exactly one user turn: resolve pending state first
//! (slot choice, then confirmation), otherwise classify and dispatch. The
//! conversation is open-ended; the caller persists the two pending values
//! between calls and renders the returned transcript in order.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use slotwise_domain::business;
use slotwise_domain::{Appointment, ChatMessage, MessageTag, Result, SlotOffer};
use tracing::debug;

use crate::calendar::CalendarStore;
use crate::dialogue::handlers::{self, ScheduleOutcome};
use crate::dialogue::intent::{self, Intent};
use crate::understand::phrases;
use crate::understand::ports::RequestUnderstanding;

/// Where the conversation stands after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    /// No pending state; the next turn is classified from scratch.
    Idle,
    /// A slot menu is open and the next turn should name a start time.
    AwaitingSlotChoice,
    /// An alternative has been proposed and awaits yes/no.
    AwaitingConfirmation,
}

/// Result of processing one user turn.
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// Transcript of this turn, user message included, in order.
    pub messages: Vec<ChatMessage>,
    /// Proposed-but-unconfirmed appointment to thread into the next turn.
    pub pending_alternative: Option<Appointment>,
    /// Open slot menu to thread into the next turn.
    pub pending_slot_offer: Option<SlotOffer>,
}

impl TurnOutput {
    fn idle(messages: Vec<ChatMessage>) -> Self {
        Self { messages, pending_alternative: None, pending_slot_offer: None }
    }

    /// Derive the state machine position from the pending values. A slot
    /// offer drives the next turn when both are somehow present.
    pub fn state(&self) -> DialogueState {
        if self.pending_slot_offer.is_some() {
            DialogueState::AwaitingSlotChoice
        } else if self.pending_alternative.is_some() {
            DialogueState::AwaitingConfirmation
        } else {
            DialogueState::Idle
        }
    }
}

/// The conversation core: calendar plus the text-understanding collaborator.
///
/// Single-threaded, synchronous, request-per-turn. The understanding port is
/// the only suspension point.
pub struct DialogueService {
    calendar: CalendarStore,
    understanding: Arc<dyn RequestUnderstanding>,
}

impl DialogueService {
    /// Create a service over an empty calendar.
    pub fn new(understanding: Arc<dyn RequestUnderstanding>) -> Self {
        Self { calendar: CalendarStore::new(), understanding }
    }

    /// Start from an existing calendar (tests, session restore).
    pub fn with_calendar(mut self, calendar: CalendarStore) -> Self {
        self.calendar = calendar;
        self
    }

    /// Read access for presentation layers (calendar sidebars, tests).
    pub fn calendar(&self) -> &CalendarStore {
        &self.calendar
    }

    /// Process one user turn.
    ///
    /// `now` anchors all relative date resolution for the turn. The returned
    /// pending values must be fed back into the next call verbatim.
    pub async fn process_turn(
        &mut self,
        text: &str,
        pending_alternative: Option<Appointment>,
        pending_slot_offer: Option<SlotOffer>,
        now: NaiveDateTime,
    ) -> Result<TurnOutput> {
        let mut messages = vec![ChatMessage::user(text)];

        // An open slot menu wins over everything else, but only while the
        // user is actually naming a time. Anything else drops the offer and
        // falls through, so the user can change their mind mid-flow.
        if let Some(offer) = pending_slot_offer {
            if let Some(time) = phrases::parse_clock_time(text) {
                return Ok(self.resolve_slot_choice(offer, time, text, messages));
            }
        }

        if let Some(alternative) = pending_alternative {
            match intent::classify(text) {
                Intent::ConfirmYes => {
                    self.calendar.add(alternative.clone());
                    messages.push(ChatMessage::assistant(
                        MessageTag::Booked,
                        "I've booked the suggested time.",
                    ));
                    messages.push(handlers::notification(Some(&alternative)));
                    return Ok(TurnOutput::idle(messages));
                }
                Intent::ConfirmNo => {
                    messages.push(ChatMessage::assistant(
                        MessageTag::Declined,
                        "No problem. Suggest another date or time when you're ready.",
                    ));
                    return Ok(TurnOutput::idle(messages));
                }
                // Anything else discards the alternative and falls through.
                _ => {}
            }
        }

        let intent = intent::classify(text);
        debug!(?intent, "classified user turn");

        match intent {
            Intent::Greeting => {
                messages.push(handlers::handle_greeting(text));
                Ok(TurnOutput::idle(messages))
            }
            Intent::List => {
                messages.push(handlers::handle_list(&self.calendar));
                Ok(TurnOutput::idle(messages))
            }
            Intent::OutOfScope => {
                messages.push(handlers::handle_out_of_scope());
                Ok(TurnOutput::idle(messages))
            }
            Intent::ConfirmYes | Intent::ConfirmNo => {
                // A stray yes/no with nothing pending; asking for a concrete
                // request beats booking a default appointment.
                messages.push(ChatMessage::assistant(
                    MessageTag::Clarification,
                    "There's nothing waiting on a yes or no right now. You can ask me to \
                     book, reschedule, or cancel an appointment.",
                ));
                Ok(TurnOutput::idle(messages))
            }
            Intent::Cancel => {
                messages.extend(handlers::handle_cancel(&mut self.calendar, text, now));
                Ok(TurnOutput::idle(messages))
            }
            Intent::Reschedule => {
                let (reschedule_messages, candidate) =
                    handlers::handle_reschedule(&mut self.calendar, text, now);
                messages.extend(reschedule_messages);

                let pending = match candidate {
                    Some(replacement) => self.schedule_and_notify(replacement, &mut messages),
                    None => None,
                };
                Ok(TurnOutput { messages, pending_alternative: pending, pending_slot_offer: None })
            }
            Intent::Create => self.handle_create(text, now, messages).await,
        }
    }

    /// Create flow: understand, then either offer slots (date-only) or run
    /// the scheduling pipeline.
    async fn handle_create(
        &mut self,
        text: &str,
        now: NaiveDateTime,
        mut messages: Vec<ChatMessage>,
    ) -> Result<TurnOutput> {
        let Some(request) = self.understanding.understand(text, now).await? else {
            messages.push(ChatMessage::assistant(
                MessageTag::Clarification,
                "I couldn't confidently understand the appointment details. Please include \
                 a date, time, and short description.",
            ));
            return Ok(TurnOutput::idle(messages));
        };

        if request.date_only {
            let date = request.start.date();
            let slots = self.calendar.available_slots(date, request.duration_minutes);
            if slots.is_empty() {
                messages.push(ChatMessage::assistant(
                    MessageTag::NoSlots,
                    format!(
                        "Sorry, there are no available slots on {} (weekends and holidays \
                         are closed). Try another day.",
                        date.format("%A %d %B")
                    ),
                ));
                return Ok(TurnOutput::idle(messages));
            }

            let times: Vec<String> =
                slots.iter().map(|(start, _)| start.format("%H:%M").to_string()).collect();
            messages.push(ChatMessage::assistant(
                MessageTag::SlotsOffered,
                format!(
                    "On {} the available times are: {}. Which time would you like? \
                     (e.g. 2pm or 14:00)",
                    date.format("%A %d %B"),
                    times.join(", ")
                ),
            ));
            let offer = SlotOffer {
                title: request.title,
                date,
                duration_minutes: request.duration_minutes,
            };
            return Ok(TurnOutput {
                messages,
                pending_alternative: None,
                pending_slot_offer: Some(offer),
            });
        }

        let pending = self.schedule_and_notify(request.to_appointment(), &mut messages);
        Ok(TurnOutput { messages, pending_alternative: pending, pending_slot_offer: None })
    }

    /// Slot-choice resolution: the user answered an open slot menu with a
    /// clock time. Failures keep the menu open and re-prompt.
    fn resolve_slot_choice(
        &mut self,
        offer: SlotOffer,
        time: NaiveTime,
        text: &str,
        mut messages: Vec<ChatMessage>,
    ) -> TurnOutput {
        let start = offer.date.and_time(time);
        let end = start + Duration::minutes(offer.duration_minutes);
        let mut appointment = Appointment::new(offer.title.clone(), start, end);
        appointment.notes = Some(text.to_string());

        if let Err(violation) = business::check_business_hours(&appointment) {
            messages.push(ChatMessage::assistant(
                MessageTag::SlotRejected,
                format!("{violation} Please pick one of the listed times."),
            ));
            return TurnOutput {
                messages,
                pending_alternative: None,
                pending_slot_offer: Some(offer),
            };
        }

        if !self.calendar.find_conflicts(&appointment).is_empty() {
            messages.push(ChatMessage::assistant(
                MessageTag::SlotRejected,
                "That time is no longer available. Please choose another from the list.",
            ));
            return TurnOutput {
                messages,
                pending_alternative: None,
                pending_slot_offer: Some(offer),
            };
        }

        self.calendar.add(appointment.clone());
        messages.push(ChatMessage::assistant(MessageTag::Booked, "Booked."));
        messages.push(handlers::notification(Some(&appointment)));
        TurnOutput::idle(messages)
    }

    /// Shared tail of the create and reschedule flows: validate, check
    /// conflicts, book or branch into conflict resolution. Returns the
    /// pending alternative when one was proposed.
    fn schedule_and_notify(
        &mut self,
        candidate: Appointment,
        messages: &mut Vec<ChatMessage>,
    ) -> Option<Appointment> {
        match handlers::try_schedule(&mut self.calendar, candidate) {
            ScheduleOutcome::Booked(appointment) => {
                messages.push(ChatMessage::assistant(
                    MessageTag::Booked,
                    "I successfully reserved that time on your calendar.",
                ));
                messages.push(handlers::notification(Some(&appointment)));
                None
            }
            ScheduleOutcome::Rejected(violation) => {
                messages.push(ChatMessage::assistant(
                    MessageTag::HoursRejected,
                    format!("{violation} {}", business::business_hours_summary()),
                ));
                messages.push(handlers::notification(None));
                None
            }
            ScheduleOutcome::Conflicted(candidate) => {
                messages.push(ChatMessage::assistant(
                    MessageTag::Conflict,
                    "The requested time conflicts with an existing event.",
                ));
                let (proposal, alternative) =
                    handlers::propose_alternative(&self.calendar, &candidate);
                messages.push(proposal);
                alternative
            }
        }
    }
}
