//! Text understanding: the port the dialogue layer consumes and the
//! rule-based implementation shipped in-tree.
//!
//! A model-backed implementation would plug in behind the same trait; the
//! fallback policy between the two belongs to whoever composes the service,
//! not to the dialogue logic.

pub mod phrases;
pub mod ports;
pub mod rules;

pub use phrases::{parse_clock_time, parse_new_start};
pub use ports::RequestUnderstanding;
pub use rules::{parse_request, RuleBasedUnderstanding};
