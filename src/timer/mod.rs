//! Cooking timer
//!
//! A single countdown with staged confirmation. A duration is staged by voice
//! or through the manual entry dialog, confirmed, and then counted down one
//! second at a time with spoken notices at fixed marks.

mod duration;
mod engine;

pub use duration::{extract_seconds, parse_manual_field};
pub use engine::{TickOutcome, TimerEngine, TimerNotice, TimerState, format_clock};
