//! Voice command interpretation
//!
//! Turns one finalized transcript into an [`Intent`]. Nothing here mutates
//! session state: the assistant applies the intent.

mod classifier;
pub mod keywords;
mod wake_word;

pub use classifier::{Classifier, ClassifyContext, CommandHook, Direction, Intent};
pub use wake_word::{
    DEFAULT_AMBIGUOUS_WAKE_WORDS, DEFAULT_DENY_PREFIXES, DEFAULT_MARKER, DEFAULT_WAKE_WORDS,
    WakeMatch, WakeWordDetector,
};
