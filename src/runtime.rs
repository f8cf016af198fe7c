//! Async runtime for the assistant core
//!
//! [`AssistantRuntime`] owns the [`Assistant`] on a single task and carries
//! out the effects it returns. Collaborator calls run in spawned tasks and
//! report back as events on the same channel, so the core only ever sees one
//! event at a time.
//!
//! Timers are one-shot and keyed by [`TimerKey`]. Scheduling a key cancels
//! its previous instance, and each instance carries a generation number so a
//! fire that was already queued when it got cancelled is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::assistant::{Assistant, AssistantEvent, AssistantSnapshot, UserAction};
use crate::config::Config;
use crate::effect::{Effect, TimerKey};
use crate::llm::LlmClient;
use crate::scheduler::{CancelToken, Scheduler, TokioScheduler};
use crate::voice::{AlertPlayer, RecognizerEvent, SpeechRecognizer, SpeechSynthesizer, play_alert};

/// External services the runtime drives
#[derive(Clone)]
pub struct Collaborators {
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub llm: Arc<dyn LlmClient>,
    pub alert: Arc<dyn AlertPlayer>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum Envelope {
    Event(AssistantEvent),
    Timer { key: TimerKey, generation: u64 },
    Shutdown,
}

/// Recognizer calls, executed in order by a dedicated worker
#[derive(Debug, Clone, Copy)]
enum RecognizerCommand {
    Start,
    Stop,
    Destroy,
}

struct TimerSlot {
    generation: u64,
    token: CancelToken,
}

/// Cloneable handle for feeding events to a running assistant
#[derive(Debug, Clone)]
pub struct AssistantHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    snapshot: watch::Receiver<AssistantSnapshot>,
}

impl AssistantHandle {
    /// Send an event to the assistant
    ///
    /// Events sent after shutdown are dropped.
    pub fn send(&self, event: AssistantEvent) {
        if let Err(e) = self.tx.send(Envelope::Event(event)) {
            tracing::debug!(envelope = ?e.0, "assistant runtime has stopped");
        }
    }

    /// Forward a recognizer callback
    ///
    /// Recognizer adapters call this from whatever thread their platform
    /// delivers events on.
    pub fn recognizer_event(&self, event: RecognizerEvent) {
        self.send(AssistantEvent::Recognizer(event));
    }

    /// Classify typed text right away
    pub fn submit_text(&self, text: impl Into<String>) {
        self.send(AssistantEvent::SubmitText(text.into()));
    }

    /// Apply a screen action
    pub fn action(&self, action: UserAction) {
        self.send(AssistantEvent::Action(action));
    }

    /// Whether the runtime is still accepting events
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Latest published state
    #[must_use]
    pub fn snapshot(&self) -> AssistantSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified after every processed event
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AssistantSnapshot> {
        self.snapshot.clone()
    }

    /// Ask the runtime to stop
    pub fn shutdown(&self) {
        let _ = self.tx.send(Envelope::Shutdown);
    }
}

/// Executes the assistant's effects
pub struct AssistantRuntime {
    assistant: Assistant,
    collaborators: Collaborators,
    scheduler: Arc<dyn Scheduler>,
    locale: String,
    alert_repeat: u32,
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
    snapshot_tx: watch::Sender<AssistantSnapshot>,
    timers: HashMap<TimerKey, TimerSlot>,
    next_generation: u64,
    recognizer_tx: Option<mpsc::UnboundedSender<RecognizerCommand>>,
    alert_stop: Option<CancellationToken>,
}

impl AssistantRuntime {
    /// Create a runtime and its handle
    #[must_use]
    pub fn new(
        assistant: Assistant,
        collaborators: Collaborators,
        config: &Config,
    ) -> (Self, AssistantHandle) {
        Self::with_scheduler(assistant, collaborators, config, Arc::new(TokioScheduler))
    }

    /// Create a runtime that schedules timers through `scheduler`
    #[must_use]
    pub fn with_scheduler(
        assistant: Assistant,
        collaborators: Collaborators,
        config: &Config,
        scheduler: Arc<dyn Scheduler>,
    ) -> (Self, AssistantHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(assistant.snapshot());

        let handle = AssistantHandle {
            tx: tx.clone(),
            snapshot: snapshot_rx,
        };

        let runtime = Self {
            assistant,
            collaborators,
            scheduler,
            locale: config.voice.locale.clone(),
            alert_repeat: config.timer.alert_repeat,
            tx,
            rx,
            snapshot_tx,
            timers: HashMap::new(),
            next_generation: 0,
            recognizer_tx: None,
            alert_stop: None,
        };

        (runtime, handle)
    }

    /// Process events until shutdown
    ///
    /// Returns the assistant so its final state can be inspected.
    pub async fn run(mut self) -> Assistant {
        let recognizer_worker = self.spawn_recognizer_worker();
        tracing::info!(locale = %self.locale, "assistant runtime started");

        while let Some(envelope) = self.rx.recv().await {
            let event = match envelope {
                Envelope::Event(event) => event,
                Envelope::Timer { key, generation } => {
                    if !self.take_timer(key, generation) {
                        tracing::trace!(?key, generation, "dropping stale timer");
                        continue;
                    }
                    AssistantEvent::TimerFired(key)
                }
                Envelope::Shutdown => break,
            };

            let effects = self.assistant.handle(event);
            for effect in effects {
                self.execute(effect);
            }
            self.snapshot_tx.send_replace(self.assistant.snapshot());
        }

        self.shutdown().await;
        if let Err(e) = recognizer_worker.await {
            tracing::warn!(error = %e, "recognizer worker panicked");
        }
        tracing::info!("assistant runtime stopped");
        self.assistant
    }

    fn execute(&mut self, effect: Effect) {
        tracing::trace!(?effect, "executing effect");
        match effect {
            Effect::StartRecognizer => self.recognizer(RecognizerCommand::Start),
            Effect::StopRecognizer => self.recognizer(RecognizerCommand::Stop),
            Effect::DestroyRecognizer => self.recognizer(RecognizerCommand::Destroy),
            Effect::Schedule { key, delay } => self.schedule(key, delay),
            Effect::Cancel(key) => self.cancel(key),
            Effect::Speak { utterance, text } => {
                let synthesizer = Arc::clone(&self.collaborators.synthesizer);
                let locale = self.locale.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = synthesizer.speak(&text, &locale).await;
                    let _ = tx.send(Envelope::Event(AssistantEvent::SpeechFinished {
                        utterance,
                        outcome,
                    }));
                });
            }
            Effect::StopSpeech => {
                let synthesizer = Arc::clone(&self.collaborators.synthesizer);
                tokio::spawn(async move { synthesizer.stop().await });
            }
            Effect::Announce(text) => {
                let synthesizer = Arc::clone(&self.collaborators.synthesizer);
                let locale = self.locale.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = synthesizer.speak(&text, &locale).await;
                    tracing::debug!(?outcome, "announcement finished");
                    let _ = tx.send(Envelope::Event(AssistantEvent::AnnouncementFinished));
                });
            }
            Effect::QueryLlm { request, payload } => {
                let llm = Arc::clone(&self.collaborators.llm);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = llm.query(&payload).await.map_err(|e| e.to_string());
                    let _ = tx.send(Envelope::Event(AssistantEvent::LlmCompleted {
                        request,
                        result,
                    }));
                });
            }
            Effect::PlayAlert => self.play_alert(),
            Effect::StopAlert => {
                if let Some(stop) = self.alert_stop.take() {
                    stop.cancel();
                }
            }
        }
    }

    fn schedule(&mut self, key: TimerKey, delay: std::time::Duration) {
        self.cancel(key);

        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.tx.clone();
        let token = self.scheduler.schedule_once(
            delay,
            Box::new(move || {
                let _ = tx.send(Envelope::Timer { key, generation });
            }),
        );

        self.timers.insert(key, TimerSlot { generation, token });
    }

    fn cancel(&mut self, key: TimerKey) {
        if let Some(slot) = self.timers.remove(&key) {
            slot.token.cancel();
        }
    }

    /// Consume the slot for a fired timer if it is still current
    fn take_timer(&mut self, key: TimerKey, generation: u64) -> bool {
        if self
            .timers
            .get(&key)
            .is_some_and(|slot| slot.generation == generation)
        {
            self.timers.remove(&key);
            return true;
        }
        false
    }

    fn play_alert(&mut self) {
        if let Some(previous) = self.alert_stop.take() {
            previous.cancel();
        }

        let stop = CancellationToken::new();
        self.alert_stop = Some(stop.clone());

        let player = Arc::clone(&self.collaborators.alert);
        let repeat = self.alert_repeat;
        tokio::spawn(async move {
            let played = play_alert(player.as_ref(), repeat, stop).await;
            tracing::info!(played, "timer alert finished");
        });
    }

    fn recognizer(&self, command: RecognizerCommand) {
        if let Some(tx) = &self.recognizer_tx
            && tx.send(command).is_err()
        {
            tracing::warn!(?command, "recognizer worker is gone");
        }
    }

    fn spawn_recognizer_worker(&mut self) -> tokio::task::JoinHandle<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.recognizer_tx = Some(tx);

        let recognizer = Arc::clone(&self.collaborators.recognizer);
        let locale = self.locale.clone();
        let events = self.tx.clone();

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                let result = match command {
                    RecognizerCommand::Start => recognizer.start(&locale).await,
                    RecognizerCommand::Stop => recognizer.stop().await,
                    RecognizerCommand::Destroy => recognizer.destroy().await,
                };

                if let Err(e) = result {
                    tracing::warn!(?command, error = %e, "recognizer call failed");
                    // Start failures surface like any other recognizer error
                    if matches!(command, RecognizerCommand::Start) {
                        let _ = events.send(Envelope::Event(AssistantEvent::Recognizer(
                            RecognizerEvent::Error(e.to_string()),
                        )));
                    }
                }
            }
        })
    }

    async fn shutdown(&mut self) {
        tracing::info!("shutting down assistant runtime");

        for slot in std::mem::take(&mut self.timers).into_values() {
            slot.token.cancel();
        }
        if let Some(stop) = self.alert_stop.take() {
            stop.cancel();
        }

        self.recognizer(RecognizerCommand::Destroy);
        // Closing the queue lets the worker finish the destroy and exit
        self.recognizer_tx = None;

        self.collaborators.synthesizer.stop().await;
    }
}
