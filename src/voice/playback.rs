//! Spoken response playback
//!
//! Every response follows the same sequence: open the response dialog, wait
//! a short delay so the dialog is on screen, speak, then close the dialog on
//! whatever outcome the synthesizer reports. A video link attached to the
//! response opens the video modal only after the dialog closes.
//!
//! A new response supersedes the one in flight. The superseded utterance is
//! stopped and its completion is recognized by id and ignored, so its video
//! and continuation are dropped.

use std::time::Duration;

use serde::Serialize;

use super::SpeechOutcome;
use crate::effect::{Effect, TimerKey};
use crate::session::CookingSession;

/// Playback state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing to say
    #[default]
    Idle,
    /// Dialog open, waiting for the pre-speech delay
    Pending,
    /// Synthesizer running
    Speaking,
}

#[derive(Debug)]
struct Utterance {
    id: u64,
    text: String,
    video_url: Option<String>,
    resume_listening: bool,
}

/// Sequences spoken responses and the response dialog
#[derive(Debug)]
pub struct PlaybackController {
    state: PlaybackState,
    current: Option<Utterance>,
    next_id: u64,
    speak_delay: Duration,
}

impl PlaybackController {
    /// Create an idle controller
    #[must_use]
    pub const fn new(speak_delay: Duration) -> Self {
        Self {
            state: PlaybackState::Idle,
            current: None,
            next_id: 1,
            speak_delay,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether a response is pending or being spoken
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// Speak a response
    ///
    /// Stops the utterance in flight, stores the video link, opens the
    /// response dialog and arms the pre-speech delay. `resume_listening`
    /// requests a recognition restart once playback ends. Returns the
    /// utterance id.
    pub fn speak(
        &mut self,
        text: String,
        video_url: Option<String>,
        resume_listening: bool,
        session: &mut CookingSession,
        out: &mut Vec<Effect>,
    ) -> u64 {
        let mut resume_listening = resume_listening;
        if let Some(previous) = self.current.take() {
            tracing::debug!(utterance = previous.id, "superseding utterance");
            resume_listening |= previous.resume_listening;
            out.push(Effect::StopSpeech);
            if previous.video_url.is_some() && video_url.is_none() {
                session.set_current_video_url(None);
            }
        }

        if video_url.is_some() {
            session.set_current_video_url(video_url.clone());
        }
        session.set_dialog_visible(true);

        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!(utterance = id, text = %text, "response queued");

        self.current = Some(Utterance {
            id,
            text,
            video_url,
            resume_listening,
        });
        self.state = PlaybackState::Pending;
        out.push(Effect::Schedule {
            key: TimerKey::SpeakDelay,
            delay: self.speak_delay,
        });
        id
    }

    /// Pre-speech delay elapsed: hand the text to the synthesizer
    pub fn on_delay_elapsed(&mut self, out: &mut Vec<Effect>) {
        if self.state != PlaybackState::Pending {
            return;
        }
        let Some(utterance) = self.current.as_ref() else {
            return;
        };

        self.state = PlaybackState::Speaking;
        out.push(Effect::Speak {
            utterance: utterance.id,
            text: utterance.text.clone(),
        });
    }

    /// Drop the response in flight and close its dialog
    ///
    /// Returns the dropped utterance's `resume_listening` flag, or `None` when
    /// nothing was queued.
    pub fn cancel(&mut self, session: &mut CookingSession, out: &mut Vec<Effect>) -> Option<bool> {
        let dropped = self.current.take()?;
        tracing::debug!(utterance = dropped.id, "utterance cancelled");

        if self.state == PlaybackState::Speaking {
            out.push(Effect::StopSpeech);
        } else {
            out.push(Effect::Cancel(TimerKey::SpeakDelay));
        }
        self.state = PlaybackState::Idle;
        session.set_dialog_visible(false);
        if dropped.video_url.is_some() {
            session.set_current_video_url(None);
        }

        Some(dropped.resume_listening)
    }

    /// Synthesizer reported an outcome
    ///
    /// Closes the dialog and opens the video modal when a link was attached.
    /// Returns `Some(resume_listening)` for the current utterance and `None`
    /// for a superseded one.
    pub fn on_finished(
        &mut self,
        utterance: u64,
        outcome: &SpeechOutcome,
        session: &mut CookingSession,
    ) -> Option<bool> {
        if self.current.as_ref().is_none_or(|current| current.id != utterance) {
            tracing::debug!(utterance, ?outcome, "ignoring superseded utterance");
            return None;
        }
        let finished = self.current.take()?;
        self.state = PlaybackState::Idle;

        match outcome {
            SpeechOutcome::Done => tracing::debug!(utterance, "response spoken"),
            SpeechOutcome::Stopped => tracing::debug!(utterance, "response stopped"),
            SpeechOutcome::Error(e) => tracing::warn!(utterance, error = %e, "speech failed"),
        }

        session.set_dialog_visible(false);
        if finished.video_url.is_some() {
            session.set_video_modal_visible(true);
        }

        Some(finished.resume_listening)
    }
}
