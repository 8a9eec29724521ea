//! Slotwise - conversational appointment scheduling assistant.
//!
//! Terminal front end: reads user turns, threads the two pending values
//! between calls, and renders the transcript plus a calendar summary. The
//! wall clock is read here, once per turn, and injected into the core.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use slotwise_core::{DialogueService, RuleBasedUnderstanding};
use slotwise_domain::{Appointment, ChatMessage, Sender, SlotOffer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn print_banner() {
    println!("=== Slotwise Appointment Assistant ===");
    println!("You can create, reschedule, or cancel appointments in natural language.");
    println!("  Create:     \"Book a dentist appointment for tomorrow at 3pm for 1 hour\"");
    println!("  Reschedule: \"Reschedule my dentist appointment to 4pm\"");
    println!("  Cancel:     \"Cancel my dentist appointment tomorrow\"");
    println!();
    println!("Type 'list' to see your calendar, 'quit' to exit.");
}

fn print_transcript(messages: &[ChatMessage]) {
    for message in messages {
        match message.sender {
            Sender::User => {}
            Sender::Assistant => println!("Assistant: {}", message.content),
        }
    }
}

fn print_calendar(service: &DialogueService) {
    let appointments = service.calendar().appointments();
    if appointments.is_empty() {
        println!("No appointments in the calendar yet.");
        return;
    }

    println!("Your current appointments:");
    for appointment in appointments {
        println!(
            "- {} | {} to {}",
            appointment.title,
            appointment.start.format("%Y-%m-%d %H:%M"),
            appointment.end.format("%H:%M")
        );
    }
}

fn print_pending_hints(
    pending_alternative: &Option<Appointment>,
    pending_slot_offer: &Option<SlotOffer>,
) {
    if let Some(alternative) = pending_alternative {
        println!(
            "Suggested slot: {}. Reply 'yes' to confirm or 'no' to decline.",
            alternative.start.format("%Y-%m-%d %H:%M")
        );
    }
    if pending_slot_offer.is_some() {
        println!("Pick a time from the list above (e.g. 2pm or 14:00).");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut service = DialogueService::new(Arc::new(RuleBasedUnderstanding));
    let mut pending_alternative: Option<Appointment> = None;
    let mut pending_slot_offer: Option<SlotOffer> = None;

    print_banner();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        print_pending_hints(&pending_alternative, &pending_slot_offer);
        print!("You: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let text = line?.trim().to_string();

        if text.is_empty() {
            println!("Please enter something.");
            continue;
        }
        if matches!(text.to_lowercase().as_str(), "quit" | "exit") {
            println!("Goodbye!");
            break;
        }
        if text.eq_ignore_ascii_case("list") {
            print_calendar(&service);
            continue;
        }

        let now = chrono::Local::now().naive_local();
        debug!(%now, "processing turn");

        let output = service
            .process_turn(
                &text,
                pending_alternative.take(),
                pending_slot_offer.take(),
                now,
            )
            .await?;

        print_transcript(&output.messages);
        pending_alternative = output.pending_alternative;
        pending_slot_offer = output.pending_slot_offer;
    }

    Ok(())
}
