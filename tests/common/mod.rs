//! Shared test utilities
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use airy_voice::session::{Ingredient, Step};
use airy_voice::{
    AlertPlayer, Collaborators, LlmClient, LlmRequest, LlmResponse, Recipe, Result,
    SpeechOutcome, SpeechRecognizer, SpeechSynthesizer,
};
use async_trait::async_trait;
use tokio::sync::Notify;

/// Recognizer that records every call in order
#[derive(Debug, Default)]
pub struct RecordingRecognizer {
    calls: Mutex<Vec<&'static str>>,
    failing_starts: AtomicU32,
}

impl RecordingRecognizer {
    /// Recognizer whose first `count` starts are refused
    pub fn failing_starts(count: u32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_starts: AtomicU32::new(count),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SpeechRecognizer for RecordingRecognizer {
    async fn start(&self, _locale: &str) -> Result<()> {
        self.record("start");
        let refused = self
            .failing_starts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(airy_voice::Error::Recognizer("permission denied".to_string()));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.record("stop");
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.record("destroy");
        Ok(())
    }
}

/// Synthesizer that takes a fixed time per utterance and can be stopped
#[derive(Debug)]
pub struct ScriptedSynthesizer {
    spoken: Mutex<Vec<String>>,
    duration: Duration,
    stop: Notify,
}

impl ScriptedSynthesizer {
    pub fn new(duration: Duration) -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            duration,
            stop: Notify::new(),
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn speak(&self, text: &str, _locale: &str) -> SpeechOutcome {
        self.spoken.lock().unwrap().push(text.to_string());
        tokio::select! {
            () = self.stop.notified() => SpeechOutcome::Stopped,
            () = tokio::time::sleep(self.duration) => SpeechOutcome::Done,
        }
    }

    async fn stop(&self) {
        self.stop.notify_waiters();
    }
}

/// LLM client answering from a queue
#[derive(Debug)]
pub struct ScriptedLlm {
    answers: Mutex<VecDeque<std::result::Result<LlmResponse, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
    latency: Duration,
}

impl ScriptedLlm {
    pub fn new(latency: Duration) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            latency,
        }
    }

    pub fn answer(self, response: LlmResponse) -> Self {
        self.answers.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: &str) -> Self {
        self.answers.lock().unwrap().push_back(Err(error.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn query(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.latency).await;

        let next = self.answers.lock().unwrap().pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(airy_voice::Error::Llm(e)),
            None => Err(airy_voice::Error::Llm("no scripted answer".to_string())),
        }
    }
}

/// Alert that counts plays
#[derive(Debug, Default)]
pub struct CountingAlert {
    plays: AtomicU32,
    released: AtomicBool,
}

impl CountingAlert {
    pub fn plays(&self) -> u32 {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertPlayer for CountingAlert {
    async fn play(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(())
    }

    async fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Fakes wired together, with typed handles kept for assertions
pub struct Fakes {
    pub recognizer: Arc<RecordingRecognizer>,
    pub synthesizer: Arc<ScriptedSynthesizer>,
    pub llm: Arc<ScriptedLlm>,
    pub alert: Arc<CountingAlert>,
}

impl Fakes {
    pub fn new(llm: ScriptedLlm) -> Self {
        Self {
            recognizer: Arc::new(RecordingRecognizer::default()),
            synthesizer: Arc::new(ScriptedSynthesizer::new(Duration::from_secs(1))),
            llm: Arc::new(llm),
            alert: Arc::new(CountingAlert::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            recognizer: self.recognizer.clone(),
            synthesizer: self.synthesizer.clone(),
            llm: self.llm.clone(),
            alert: self.alert.clone(),
        }
    }
}

/// Three-step recipe whose second step carries a duration
pub fn sample_recipe() -> Arc<Recipe> {
    Arc::new(Recipe {
        id: "nikujaga".to_string(),
        title: "肉じゃが".to_string(),
        servings: 2,
        ingredients: vec![
            Ingredient {
                name: "じゃがいも".to_string(),
                amount: "3個".to_string(),
            },
            Ingredient {
                name: "牛肉".to_string(),
                amount: "200g".to_string(),
            },
        ],
        steps: vec![
            Step {
                id: "1".to_string(),
                description: "材料を切る".to_string(),
                image: None,
            },
            Step {
                id: "2".to_string(),
                description: "5分加熱".to_string(),
                image: None,
            },
            Step {
                id: "3".to_string(),
                description: "盛り付ける".to_string(),
                image: None,
            },
        ],
        ..Recipe::default()
    })
}
