//! Voice pipeline
//!
//! Speech recognition, synthesis and the timer alert are external
//! collaborators behind the traits below. The controllers in this module are
//! pure state machines: they decide *when* to talk to those collaborators and
//! leave the actual calls to the runtime.

mod alert;
mod playback;
mod recognition;

use async_trait::async_trait;

pub use alert::{DEFAULT_ALERT_REPEAT, play_alert};
pub use playback::{PlaybackController, PlaybackState};
pub use recognition::{RecognitionController, RecognitionState, RecognitionStatus};

use crate::Result;

/// Event emitted by the speech recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// Recognizer began listening
    Start,
    /// Recognizer stopped on its own
    End,
    /// Partial or final transcript
    Result(String),
    /// Device, permission or network failure
    Error(String),
}

/// How an utterance ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Played to the end
    Done,
    /// Interrupted by `stop`
    Stopped,
    /// Synthesis failed
    Error(String),
}

/// External speech-to-text engine
///
/// Recognizer events are posted to the runtime separately (see
/// [`crate::runtime::AssistantHandle::recognizer_event`]).
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Start listening in the given locale
    async fn start(&self, locale: &str) -> Result<()>;

    /// Stop listening
    async fn stop(&self) -> Result<()>;

    /// Release the recognizer handle
    async fn destroy(&self) -> Result<()>;
}

/// External text-to-speech engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`, resolving when the utterance ends for any reason
    async fn speak(&self, text: &str, locale: &str) -> SpeechOutcome;

    /// Interrupt the current utterance
    async fn stop(&self);
}

/// Sound played when the timer finishes
#[async_trait]
pub trait AlertPlayer: Send + Sync {
    /// Play the alert once, resolving when playback ends
    async fn play(&self) -> Result<()>;

    /// Release audio resources
    async fn release(&self);
}
