//! Recognition lifecycle and transcript debouncing
//!
//! Recognizers stream partial transcripts that keep changing until the
//! speaker pauses. The controller keeps only the latest one and hands it on
//! when no new partial has arrived for the debounce window (trailing edge),
//! or right away when the recognizer ends or fails with a transcript pending.
//!
//! ```text
//!            start()              on_result()
//!   Idle ─────────────▶ Listening ───────────▶ Debouncing ──┐
//!    ▲                                            │   ▲     │ on_result()
//!    │   debounce elapsed / end / error / stop    │   └─────┘ (window restarts)
//!    └────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use serde::Serialize;

use crate::effect::{Effect, TimerKey};

/// Listening state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionState {
    /// Not listening
    #[default]
    Idle,
    /// Recognizer running, nothing heard yet
    Listening,
    /// Transcript buffered, waiting for the window to elapse
    Debouncing,
}

/// Observable recognition status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionStatus {
    pub state: RecognitionState,
    pub hands_free: bool,
    pub last_error: Option<String>,
}

/// Drives the external recognizer and debounces its transcripts
#[derive(Debug)]
pub struct RecognitionController {
    state: RecognitionState,
    hands_free: bool,
    transcript: String,
    last_error: Option<String>,
    debounce: Duration,
}

impl RecognitionController {
    /// Create an idle controller with the given debounce window
    #[must_use]
    pub const fn new(debounce: Duration) -> Self {
        Self {
            state: RecognitionState::Idle,
            hands_free: false,
            transcript: String::new(),
            last_error: None,
            debounce,
        }
    }

    #[must_use]
    pub const fn state(&self) -> RecognitionState {
        self.state
    }

    /// Whether the recognizer is expected to be running
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state != RecognitionState::Idle
    }

    /// Whether continuous listening is enabled
    #[must_use]
    pub const fn is_hands_free(&self) -> bool {
        self.hands_free
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Snapshot for observers
    #[must_use]
    pub fn status(&self) -> RecognitionStatus {
        RecognitionStatus {
            state: self.state,
            hands_free: self.hands_free,
            last_error: self.last_error.clone(),
        }
    }

    /// Enable hands-free mode and start listening
    pub fn start(&mut self, out: &mut Vec<Effect>) {
        self.hands_free = true;
        self.last_error = None;
        self.begin(out);
    }

    /// Disable hands-free mode and stop listening
    ///
    /// A pending transcript is discarded without dispatch.
    pub fn stop(&mut self, out: &mut Vec<Effect>) {
        tracing::debug!(pending = !self.transcript.is_empty(), "recognition stopped");
        self.hands_free = false;
        self.halt(out);
    }

    /// Stop the recognizer while the assistant speaks
    ///
    /// Hands-free mode stays on so [`Self::restart`] resumes listening later.
    pub fn suspend(&mut self, out: &mut Vec<Effect>) {
        self.halt(out);
    }

    /// Recreate the recognizer and listen again
    ///
    /// Does nothing outside hands-free mode. Returns whether a restart was
    /// requested.
    pub fn restart(&mut self, out: &mut Vec<Effect>) -> bool {
        if !self.hands_free {
            return false;
        }

        tracing::debug!("restarting recognition");
        out.push(Effect::DestroyRecognizer);
        self.begin(out);
        true
    }

    /// Recognizer reported that it started
    pub fn on_start(&mut self) {
        if !self.hands_free {
            return;
        }
        self.state = RecognitionState::Listening;
        self.transcript.clear();
    }

    /// Buffer a partial transcript and restart the debounce window
    ///
    /// Returns `false` when the result arrived while idle and was ignored.
    pub fn on_result(&mut self, transcript: &str, out: &mut Vec<Effect>) -> bool {
        if self.state == RecognitionState::Idle {
            tracing::trace!(transcript, "ignoring result while idle");
            return false;
        }

        transcript.clone_into(&mut self.transcript);
        self.last_error = None;
        self.state = RecognitionState::Debouncing;
        out.push(Effect::Schedule {
            key: TimerKey::Debounce,
            delay: self.debounce,
        });
        true
    }

    /// Debounce window elapsed: hand over the settled transcript
    pub fn on_debounce_elapsed(&mut self) -> Option<String> {
        if self.state != RecognitionState::Debouncing {
            return None;
        }

        self.state = RecognitionState::Idle;
        let transcript = std::mem::take(&mut self.transcript);
        (!transcript.trim().is_empty()).then_some(transcript)
    }

    /// Recognizer ended on its own: flush any pending transcript
    pub fn on_end(&mut self, out: &mut Vec<Effect>) -> Option<String> {
        self.flush(out)
    }

    /// Recognizer failed: record the error and flush any pending transcript
    pub fn on_error(&mut self, message: &str, out: &mut Vec<Effect>) -> Option<String> {
        tracing::warn!(error = message, "recognizer error");
        self.last_error = Some(message.to_string());
        self.flush(out)
    }

    fn begin(&mut self, out: &mut Vec<Effect>) {
        self.state = RecognitionState::Listening;
        self.transcript.clear();
        out.push(Effect::Cancel(TimerKey::Debounce));
        out.push(Effect::StartRecognizer);
    }

    fn halt(&mut self, out: &mut Vec<Effect>) {
        self.state = RecognitionState::Idle;
        self.transcript.clear();
        out.push(Effect::Cancel(TimerKey::Debounce));
        out.push(Effect::StopRecognizer);
    }

    fn flush(&mut self, out: &mut Vec<Effect>) -> Option<String> {
        let pending = self.state == RecognitionState::Debouncing;
        self.state = RecognitionState::Idle;
        let transcript = std::mem::take(&mut self.transcript);

        if !pending {
            return None;
        }

        out.push(Effect::Cancel(TimerKey::Debounce));
        (!transcript.trim().is_empty()).then_some(transcript)
    }
}
