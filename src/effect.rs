//! Side effects requested by the assistant core
//!
//! The core never touches a collaborator directly. Every state transition
//! returns a list of [`Effect`]s that the runtime executes in order, and the
//! outcome of each one comes back later as an
//! [`AssistantEvent`](crate::assistant::AssistantEvent).

use std::time::Duration;

use crate::llm::LlmRequest;

/// Logical one-shot timers owned by the core
///
/// Each key has at most one pending instance: scheduling a key again replaces
/// (and cancels) the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Trailing-edge debounce of partial transcripts
    Debounce,
    /// Short pause between opening the response dialog and starting synthesis
    SpeakDelay,
    /// One-second countdown tick
    Tick,
    /// Delayed recognizer restart after an error with nothing to dispatch
    RecognizerRetry,
}

/// A side effect for the runtime to perform
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start the external recognizer
    StartRecognizer,
    /// Stop the external recognizer
    StopRecognizer,
    /// Destroy the recognizer handle (first half of a restart)
    DestroyRecognizer,
    /// Arm a one-shot timer
    Schedule {
        /// Which timer
        key: TimerKey,
        /// Delay before it fires
        delay: Duration,
    },
    /// Disarm a one-shot timer (no-op when not armed)
    Cancel(TimerKey),
    /// Synthesize a response utterance
    Speak {
        /// Utterance id echoed back in the completion event
        utterance: u64,
        /// Text to speak
        text: String,
    },
    /// Stop the in-flight utterance
    StopSpeech,
    /// Speak a timer announcement outside the response protocol
    ///
    /// Completion is reported with `AnnouncementFinished`.
    Announce(String),
    /// Send a free-form query to the LLM service
    QueryLlm {
        /// Request id echoed back in the completion event
        request: u64,
        /// Query payload
        payload: LlmRequest,
    },
    /// Start the end-of-timer alert loop
    PlayAlert,
    /// Stop the alert loop and release the player
    StopAlert,
}
