//! Intent classification.
//!
//! A deterministic total function from raw text to exactly one dialogue
//! intent. The evaluation order is fixed and load-bearing: the categories
//! are not mutually exclusive by keyword alone ("cancel it" is a
//! confirmation, "cancel my appointment" is a cancellation), so reordering
//! the checks changes behavior.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Dialogue intent for one user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    List,
    Cancel,
    Reschedule,
    ConfirmYes,
    ConfirmNo,
    OutOfScope,
    Create,
}

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "howdy",
    "hi there",
    "hello there",
    "greetings",
    "hey there",
    "what's up",
    "sup",
    "yo",
    "good day",
    "morning",
    "afternoon",
];

const HOW_ARE_YOU: &[&str] =
    &["how are you", "how're you", "how r u", "how are u", "how do you do"];

const BOOKING_KEYWORDS: &[&str] = &[
    "book",
    "schedule",
    "appointment",
    "meeting",
    "slot",
    "add",
    "set up",
    "reserve",
    "plan",
    "organize",
    "calendar",
    "cancel",
    "reschedule",
    "move",
];

const DATE_WORDS: &[&str] = &[
    "today",
    "tomorrow",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "next week",
];

const OUT_OF_SCOPE_PHRASES: &[&str] = &[
    "weather",
    "how is the weather",
    "what's the weather",
    "tell me a joke",
    "joke",
    "what time is it",
    "what's the time",
    "who are you",
    "what can you do",
    "help me with",
    "random",
    "news",
    "sports",
    "recipe",
    "movie",
    "music",
    "game",
];

// 1-12 with optional :mm and an am/pm marker, e.g. "2pm", "10:30am".
static TIME_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}(?::\d{2})?\s*(?:am|pm)\b")
        .expect("TIME_MENTION should compile - this is a bug")
});

/// Classify one user turn.
pub fn classify(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    let t = lowered.trim();

    if is_greeting(t) {
        return Intent::Greeting;
    }
    if matches!(t, "yes" | "confirm" | "ok" | "sure" | "yep") {
        return Intent::ConfirmYes;
    }
    if matches!(t, "no" | "nope" | "cancel it" | "no thanks") {
        return Intent::ConfirmNo;
    }
    if is_out_of_scope(t) {
        return Intent::OutOfScope;
    }
    if contains_any(t, &["cancel", "remove", "delete"])
        && contains_any(t, &["appointment", "meeting", "event"])
    {
        return Intent::Cancel;
    }
    if contains_any(t, &["reschedule", "move", "rebook", "change"])
        && contains_any(t, &["appointment", "meeting", " to ", " at "])
    {
        return Intent::Reschedule;
    }
    if contains_any(t, &["list", "show", "what", "view", "see"])
        && contains_any(t, &["appointment", "schedule", "calendar", "have", "booked"])
    {
        return Intent::List;
    }
    if !looks_like_booking(t) {
        return Intent::OutOfScope;
    }
    Intent::Create
}

/// True when the user is asking how we are; changes the greeting reply
/// tone, never the intent tag.
pub fn is_how_are_you(text: &str) -> bool {
    let t = text.to_lowercase();
    contains_any(t.trim(), HOW_ARE_YOU)
}

fn contains_any(t: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| t.contains(needle))
}

fn is_greeting(t: &str) -> bool {
    if GREETINGS.contains(&t) {
        return true;
    }
    if t.len() <= 25
        && (t.ends_with('!') || t.ends_with('?'))
        && contains_any(t, &["hi", "hello", "hey"])
    {
        return true;
    }
    // "How are you?" style gets a warm greeting reply.
    contains_any(t, HOW_ARE_YOU)
}

fn looks_like_booking(t: &str) -> bool {
    contains_any(t, BOOKING_KEYWORDS) || TIME_MENTION.is_match(t) || contains_any(t, DATE_WORDS)
}

fn is_out_of_scope(t: &str) -> bool {
    if contains_any(t, OUT_OF_SCOPE_PHRASES) {
        return true;
    }
    // Longer general questions that do not look booking-related.
    t.len() > 10 && t.contains('?') && !looks_like_booking(t)
}
