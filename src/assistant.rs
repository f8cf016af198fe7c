//! Hands-free cooking assistant core
//!
//! [`Assistant`] owns the session, the timer and the voice controllers. It is
//! driven by [`AssistantEvent`]s and answers each one with the [`Effect`]s
//! the runtime must perform. It never awaits, sleeps or calls a collaborator,
//! so every ordering rule can be tested synchronously.
//!
//! ```text
//!  recognizer ──▶ RecognitionController ──(debounced transcript)──▶ Classifier
//!                        ▲                                              │
//!                        │ restart                                   Intent
//!                        │                                              ▼
//!  synthesizer ◀── PlaybackController ◀── reply / LLM answer ◀── apply_intent ──▶ session, timer
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::command::{Classifier, ClassifyContext, CommandHook, Direction, Intent, WakeWordDetector};
use crate::config::Config;
use crate::effect::{Effect, TimerKey};
use crate::llm::{LlmRequest, LlmResponse};
use crate::session::{CookingSession, Panel, Recipe};
use crate::timer::{TimerEngine, TimerState};
use crate::voice::{
    PlaybackController, PlaybackState, RecognitionController, RecognitionStatus, RecognizerEvent,
    SpeechOutcome,
};
use crate::Result;

/// Reply to a bare wake word
pub const PROMPT_REPLY: &str = "はい、何をお手伝いしましょうか？";

/// Reply after moving to the next step
pub const NEXT_STEP_REPLY: &str = "次のステップに進みます";

/// Reply after moving to the previous step
pub const PREVIOUS_STEP_REPLY: &str = "前のステップに戻ります";

/// Reply after switching to the ingredient list
pub const SHOW_INGREDIENTS_REPLY: &str = "材料リストを表示します";

/// Reply after switching to the step list
pub const SHOW_STEPS_REPLY: &str = "手順リストを表示します";

/// Placeholder shown while the LLM is answering
pub const PROCESSING_PLACEHOLDER: &str = "質問を処理しています...";

/// Apology when the LLM reports a failure
pub const LLM_FAILURE_REPLY: &str = "申し訳ありません、応答の処理中にエラーが発生しました";

/// Apology when the LLM call itself fails
pub const LLM_ERROR_REPLY: &str = "申し訳ありません、処理中にエラーが発生しました";

/// Input to the assistant core
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    /// Event from the speech recognizer
    Recognizer(RecognizerEvent),
    /// Text typed or injected by the UI, bypassing the debounce
    SubmitText(String),
    /// A scheduled timer fired
    TimerFired(TimerKey),
    /// The synthesizer finished an utterance
    SpeechFinished {
        utterance: u64,
        outcome: SpeechOutcome,
    },
    /// The synthesizer finished a timer announcement
    AnnouncementFinished,
    /// The LLM query completed (the error is already rendered as text)
    LlmCompleted {
        request: u64,
        result: std::result::Result<LlmResponse, String>,
    },
    /// Something the user did on screen
    Action(UserAction),
}

/// Screen actions
#[derive(Debug, Clone)]
pub enum UserAction {
    StartListening,
    StopListening,
    SelectRecipe(Arc<Recipe>),
    NextStep,
    PreviousStep,
    GoToStep(usize),
    ShowPanel(Panel),
    ShowTimerDialog {
        seconds: u32,
        description: Option<String>,
    },
    HideTimerDialog,
    StartTimer,
    PauseTimer,
    ResetTimer,
    ShowManualTimer,
    HideManualTimer,
    SubmitManualTimer {
        minutes: String,
        seconds: String,
    },
    StopAlert,
    CloseVideo,
    DismissResponse,
    ResetSession,
}

/// Everything a UI needs to render the assistant
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantSnapshot {
    pub session: CookingSession,
    pub timer: TimerState,
    pub recognition: RecognitionStatus,
    pub playback: PlaybackState,
    /// LLM queries awaiting an answer
    pub pending_queries: usize,
}

/// The assistant state machine
#[derive(Debug)]
pub struct Assistant {
    session: CookingSession,
    timer: TimerEngine,
    recognition: RecognitionController,
    playback: PlaybackController,
    classifier: Classifier,
    error_retry: std::time::Duration,
    next_request: u64,
    pending_queries: usize,
    announcements: usize,
    outbox: Vec<Effect>,
}

impl Assistant {
    /// Create an assistant from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the wake word configuration is invalid
    pub fn new(config: &Config) -> Result<Self> {
        let wake = WakeWordDetector::from_config(&config.wake)?;
        Ok(Self {
            session: CookingSession::new(),
            timer: TimerEngine::new(),
            recognition: RecognitionController::new(config.voice.debounce),
            playback: PlaybackController::new(config.voice.speak_delay),
            classifier: Classifier::new(wake),
            error_retry: config.voice.error_retry,
            next_request: 1,
            pending_queries: 0,
            announcements: 0,
            outbox: Vec::new(),
        })
    }

    /// Register the screen's command hook
    ///
    /// The hook sees every utterance before the built-in rules, and one that
    /// reports `true` shadows all of them.
    pub fn set_command_hook(&mut self, hook: Box<dyn CommandHook>) {
        self.classifier.set_hook(hook);
    }

    /// Remove the screen's command hook
    pub fn clear_command_hook(&mut self) {
        self.classifier.clear_hook();
    }

    #[must_use]
    pub const fn session(&self) -> &CookingSession {
        &self.session
    }

    #[must_use]
    pub const fn timer(&self) -> &TimerState {
        self.timer.state()
    }

    #[must_use]
    pub const fn recognition(&self) -> &RecognitionController {
        &self.recognition
    }

    #[must_use]
    pub const fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Snapshot for observers
    #[must_use]
    pub fn snapshot(&self) -> AssistantSnapshot {
        AssistantSnapshot {
            session: self.session.clone(),
            timer: self.timer.state().clone(),
            recognition: self.recognition.status(),
            playback: self.playback.state(),
            pending_queries: self.pending_queries,
        }
    }

    /// Process one event and return the effects to perform, in order
    pub fn handle(&mut self, event: AssistantEvent) -> Vec<Effect> {
        match event {
            AssistantEvent::Recognizer(event) => self.on_recognizer(event),
            AssistantEvent::SubmitText(text) => self.submit_text(&text),
            AssistantEvent::TimerFired(key) => self.on_timer(key),
            AssistantEvent::SpeechFinished { utterance, outcome } => {
                if let Some(resume) = self.playback.on_finished(utterance, &outcome, &mut self.session)
                    && resume
                {
                    self.resume_listening();
                }
            }
            AssistantEvent::AnnouncementFinished => {
                self.announcements = self.announcements.saturating_sub(1);
                self.resume_listening();
            }
            AssistantEvent::LlmCompleted { request, result } => self.complete_query(request, result),
            AssistantEvent::Action(action) => self.apply_action(action),
        }

        std::mem::take(&mut self.outbox)
    }

    fn on_recognizer(&mut self, event: RecognizerEvent) {
        match event {
            RecognizerEvent::Start => self.recognition.on_start(),
            RecognizerEvent::Result(transcript) => {
                if self.recognition.on_result(&transcript, &mut self.outbox) {
                    self.session.set_recognized_text(transcript);
                }
            }
            RecognizerEvent::End => {
                if let Some(transcript) = self.recognition.on_end(&mut self.outbox) {
                    self.dispatch(&transcript);
                }
            }
            RecognizerEvent::Error(message) => {
                match self.recognition.on_error(&message, &mut self.outbox) {
                    Some(transcript) => self.dispatch(&transcript),
                    None if self.recognition.is_hands_free() => {
                        self.outbox.push(Effect::Schedule {
                            key: TimerKey::RecognizerRetry,
                            delay: self.error_retry,
                        });
                    }
                    None => {}
                }
            }
        }
    }

    fn on_timer(&mut self, key: TimerKey) {
        match key {
            TimerKey::Debounce => {
                if let Some(transcript) = self.recognition.on_debounce_elapsed() {
                    self.dispatch(&transcript);
                }
            }
            TimerKey::SpeakDelay => self.playback.on_delay_elapsed(&mut self.outbox),
            TimerKey::Tick => self.tick(),
            TimerKey::RecognizerRetry => self.resume_listening(),
        }
    }

    fn submit_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.session.set_recognized_text(text);
        self.dispatch(text);
    }

    fn dispatch(&mut self, transcript: &str) {
        tracing::debug!(transcript, "dispatching transcript");

        let context = ClassifyContext {
            current_step: self.session.current_step().map(|step| step.description.as_str()),
            timer_dialog_open: self.timer.state().is_confirm_dialog_visible,
            video_modal_open: self.session.video().is_visible,
        };
        let intent = self.classifier.classify(transcript, &context);

        tracing::info!(?intent, "utterance classified");
        self.apply_intent(intent);
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::External | Intent::Noop => self.resume_listening(),
            Intent::VideoControl { action } => {
                self.session.apply_video_action(action);
                self.resume_listening();
            }
            Intent::TimerConfirm => {
                self.start_timer();
                self.resume_listening();
            }
            Intent::TimerCancel => {
                self.timer.hide_timer_dialog();
                self.resume_listening();
            }
            Intent::TimerSetup {
                seconds,
                description,
            } => {
                self.timer.show_timer_dialog(seconds, description);
                self.resume_listening();
            }
            Intent::Prompt { utterance } => self.reply(utterance, PROMPT_REPLY),
            Intent::Navigate {
                direction,
                utterance,
            } => {
                let reply = match direction {
                    Direction::Next => {
                        self.session.next_step();
                        NEXT_STEP_REPLY
                    }
                    Direction::Previous => {
                        self.session.previous_step();
                        PREVIOUS_STEP_REPLY
                    }
                };
                self.reply(utterance, reply);
            }
            Intent::ShowIngredients { utterance } => {
                self.session.set_panel(Panel::Ingredients);
                self.reply(utterance, SHOW_INGREDIENTS_REPLY);
            }
            Intent::ShowSteps { utterance } => {
                self.session.set_panel(Panel::Steps);
                self.reply(utterance, SHOW_STEPS_REPLY);
            }
            Intent::FreeForm { text } => self.ask(text),
        }
    }

    /// Log a command and its fixed confirmation, then speak it
    fn reply(&mut self, utterance: String, reply: &str) {
        self.session.set_last_ai_response(Some(reply.to_string()));
        self.session.add_conversation_message(utterance, true);
        self.session.add_conversation_message(reply, false);
        self.recognition.suspend(&mut self.outbox);
        self.playback
            .speak(reply.to_string(), None, true, &mut self.session, &mut self.outbox);
    }

    /// Forward a question to the LLM
    fn ask(&mut self, text: String) {
        self.session.add_conversation_message(text.clone(), true);
        self.session
            .set_last_ai_response(Some(PROCESSING_PLACEHOLDER.to_string()));
        self.session.set_dialog_visible(true);
        self.recognition.suspend(&mut self.outbox);

        let request = self.next_request;
        self.next_request += 1;
        self.pending_queries += 1;

        tracing::info!(request, text = %text, "querying LLM");
        let payload = LlmRequest {
            text,
            recipe_context: self.session.recipe_context(),
        };
        self.outbox.push(Effect::QueryLlm { request, payload });
    }

    fn complete_query(&mut self, request: u64, result: std::result::Result<LlmResponse, String>) {
        self.pending_queries = self.pending_queries.saturating_sub(1);
        // The processing dialog closes here; speaking reopens it right away
        self.session.set_dialog_visible(false);

        let (reply, video_url) = match result {
            Ok(response) => match response.text() {
                Some(text) => (text.to_string(), response.video_url.clone()),
                None => {
                    tracing::warn!(request, error = ?response.error, "LLM reported failure");
                    (LLM_FAILURE_REPLY.to_string(), None)
                }
            },
            Err(e) => {
                tracing::warn!(request, error = %e, "LLM query failed");
                (LLM_ERROR_REPLY.to_string(), None)
            }
        };

        self.session.set_last_ai_response(Some(reply.clone()));
        self.session.add_conversation_message(reply.clone(), false);
        self.playback
            .speak(reply, video_url, true, &mut self.session, &mut self.outbox);
    }

    /// Restart recognition unless something is still due to be spoken
    fn resume_listening(&mut self) {
        if self.playback.is_busy() || self.pending_queries > 0 || self.announcements > 0 {
            tracing::trace!("deferring recognition restart");
            return;
        }
        self.outbox.push(Effect::Cancel(TimerKey::RecognizerRetry));
        self.recognition.restart(&mut self.outbox);
    }

    fn start_timer(&mut self) {
        self.timer.start();
        if self.timer.should_tick() {
            self.outbox.push(schedule_tick());
        }
    }

    fn tick(&mut self) {
        let Some(outcome) = self.timer.tick() else {
            return;
        };

        if let Some(notice) = outcome.notice {
            tracing::info!(remaining = outcome.remaining, ?notice, "timer notice");
            // The notice itself contains the timer trigger word
            if self.recognition.is_listening() {
                self.recognition.suspend(&mut self.outbox);
            }
            self.announcements += 1;
            self.outbox.push(Effect::Announce(notice.message().to_string()));
            if notice.plays_alert() {
                self.outbox.push(Effect::PlayAlert);
            }
        }

        if self.timer.should_tick() {
            self.outbox.push(schedule_tick());
        }
    }

    fn apply_action(&mut self, action: UserAction) {
        match action {
            UserAction::StartListening => {
                self.outbox.push(Effect::Cancel(TimerKey::RecognizerRetry));
                self.recognition.start(&mut self.outbox);
            }
            UserAction::StopListening => {
                self.outbox.push(Effect::Cancel(TimerKey::RecognizerRetry));
                self.recognition.stop(&mut self.outbox);
            }
            UserAction::SelectRecipe(recipe) => self.session.set_current_recipe(recipe),
            UserAction::NextStep => self.session.next_step(),
            UserAction::PreviousStep => self.session.previous_step(),
            UserAction::GoToStep(index) => self.session.go_to_step(index),
            UserAction::ShowPanel(panel) => self.session.set_panel(panel),
            UserAction::ShowTimerDialog {
                seconds,
                description,
            } => self.timer.show_timer_dialog(seconds, description),
            UserAction::HideTimerDialog => self.timer.hide_timer_dialog(),
            UserAction::StartTimer => self.start_timer(),
            UserAction::PauseTimer => {
                self.timer.pause();
                self.outbox.push(Effect::Cancel(TimerKey::Tick));
            }
            UserAction::ResetTimer => {
                self.timer.reset();
                self.outbox.push(Effect::Cancel(TimerKey::Tick));
                self.outbox.push(Effect::StopAlert);
            }
            UserAction::ShowManualTimer => self.timer.show_manual_entry(),
            UserAction::HideManualTimer => self.timer.hide_manual_entry(),
            UserAction::SubmitManualTimer { minutes, seconds } => {
                self.timer.submit_manual_entry(&minutes, &seconds);
            }
            UserAction::StopAlert => self.outbox.push(Effect::StopAlert),
            UserAction::CloseVideo => self.session.set_video_modal_visible(false),
            UserAction::DismissResponse => self.session.set_last_ai_response(None),
            UserAction::ResetSession => {
                let resume = self.playback.cancel(&mut self.session, &mut self.outbox);
                self.session.reset();
                if resume == Some(true) {
                    self.resume_listening();
                }
            }
        }
    }
}

const fn schedule_tick() -> Effect {
    Effect::Schedule {
        key: TimerKey::Tick,
        delay: std::time::Duration::from_secs(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant() -> Assistant {
        Assistant::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_submit_text_bypasses_debounce() {
        let mut assistant = assistant();
        let effects = assistant.handle(AssistantEvent::SubmitText("  アイリ次へ ".to_string()));

        assert_eq!(assistant.session().recognized_text(), "アイリ次へ");
        assert_eq!(assistant.session().conversation_history().len(), 2);
        assert!(effects.contains(&Effect::Schedule {
            key: TimerKey::SpeakDelay,
            delay: Config::default().voice.speak_delay,
        }));
    }

    #[test]
    fn test_blank_submission_ignored() {
        let mut assistant = assistant();
        assert!(assistant.handle(AssistantEvent::SubmitText("   ".to_string())).is_empty());
        assert_eq!(assistant.session().recognized_text(), "");
    }

    #[test]
    fn test_pause_cancels_tick() {
        let mut assistant = assistant();
        assistant.handle(AssistantEvent::Action(UserAction::ShowTimerDialog {
            seconds: 10,
            description: None,
        }));

        let started = assistant.handle(AssistantEvent::Action(UserAction::StartTimer));
        assert_eq!(started, vec![schedule_tick()]);

        let paused = assistant.handle(AssistantEvent::Action(UserAction::PauseTimer));
        assert_eq!(paused, vec![Effect::Cancel(TimerKey::Tick)]);

        // A tick that was already queued does nothing
        assert!(assistant.handle(AssistantEvent::TimerFired(TimerKey::Tick)).is_empty());
        assert_eq!(assistant.timer().remaining_seconds, 10);
    }

    #[test]
    fn test_error_without_transcript_schedules_retry() {
        let mut assistant = assistant();
        assistant.handle(AssistantEvent::Action(UserAction::StartListening));

        let effects = assistant.handle(AssistantEvent::Recognizer(RecognizerEvent::Error(
            "no match".to_string(),
        )));
        assert!(effects.contains(&Effect::Schedule {
            key: TimerKey::RecognizerRetry,
            delay: Config::default().voice.error_retry,
        }));
        assert_eq!(assistant.recognition().last_error(), Some("no match"));

        let retried = assistant.handle(AssistantEvent::TimerFired(TimerKey::RecognizerRetry));
        assert!(retried.contains(&Effect::StartRecognizer));
    }

    #[test]
    fn test_snapshot_serializes() {
        let assistant = assistant();
        let json = serde_json::to_value(assistant.snapshot()).unwrap();

        assert_eq!(json["recognition"]["state"], "idle");
        assert_eq!(json["playback"], "idle");
        assert_eq!(json["timer"]["isActive"], false);
        assert_eq!(json["session"]["currentStepIndex"], 0);
    }
}
