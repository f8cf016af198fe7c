//! Terminal stand-ins for the device speech services
//!
//! Used by the `airy repl` command: speech is printed instead of spoken,
//! there is no microphone, and the alert rings the terminal bell.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::Result;
use crate::voice::{AlertPlayer, SpeechOutcome, SpeechRecognizer, SpeechSynthesizer};

/// Prints responses to stdout
#[derive(Debug, Default)]
pub struct ConsoleSynthesizer {
    stop: Notify,
    pace: Option<Duration>,
}

impl ConsoleSynthesizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold each response for `per_char` per character, as a voice would
    #[must_use]
    pub const fn paced(per_char: Duration) -> Self {
        Self {
            stop: Notify::const_new(),
            pace: Some(per_char),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ConsoleSynthesizer {
    async fn speak(&self, text: &str, locale: &str) -> SpeechOutcome {
        tracing::debug!(locale, chars = text.chars().count(), "speaking");
        println!("🔊 {text}");

        let Some(per_char) = self.pace else {
            return SpeechOutcome::Done;
        };
        let length = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);

        tokio::select! {
            () = self.stop.notified() => SpeechOutcome::Stopped,
            () = tokio::time::sleep(per_char.saturating_mul(length)) => SpeechOutcome::Done,
        }
    }

    async fn stop(&self) {
        self.stop.notify_waiters();
    }
}

/// Recognizer with no microphone behind it
///
/// Typed input reaches the assistant through
/// [`crate::runtime::AssistantHandle::submit_text`] instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentRecognizer;

#[async_trait]
impl SpeechRecognizer for SilentRecognizer {
    async fn start(&self, locale: &str) -> Result<()> {
        tracing::debug!(locale, "recognizer started (console)");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        tracing::debug!("recognizer stopped (console)");
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        Ok(())
    }
}

/// Rings the terminal bell once per second
#[derive(Debug, Default, Clone, Copy)]
pub struct BellAlert;

#[async_trait]
impl AlertPlayer for BellAlert {
    async fn play(&self) -> Result<()> {
        println!("\x07🔔");
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }

    async fn release(&self) {}
}
