//! AIry Voice - Hands-free voice command core for a cooking assistant
//!
//! This library provides the voice layer of the AIry Recipe app:
//! - Wake word detection and command classification
//! - Transcript debouncing and recognizer lifecycle
//! - Spoken responses with the response dialog and video hand-off
//! - Cooking timer with spoken notices and a finish alert
//! - Free-form questions answered by an LLM service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Device services (traits)               │
//! │  Recognizer  │  Synthesizer  │  LLM  │  Alert       │
//! └────────────────────┬────────────────────────────────┘
//!                      │ events ▲ effects
//! ┌────────────────────▼───────┴────────────────────────┐
//! │                AssistantRuntime                      │
//! │   event queue  │  keyed timers  │  snapshot watch   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Assistant (sans-IO)                  │
//! │  Classifier │ Recognition │ Playback │ Timer │ Session │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod assistant;
pub mod command;
pub mod config;
pub mod console;
pub mod effect;
pub mod error;
pub mod llm;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod text;
pub mod timer;
pub mod video;
pub mod voice;

pub use assistant::{Assistant, AssistantEvent, AssistantSnapshot, UserAction};
pub use command::{Classifier, ClassifyContext, CommandHook, Direction, Intent, WakeWordDetector};
pub use config::Config;
pub use effect::{Effect, TimerKey};
pub use error::{Error, Result};
pub use llm::{HttpLlmClient, LlmClient, LlmRequest, LlmResponse, OfflineLlmClient};
pub use runtime::{AssistantHandle, AssistantRuntime, Collaborators};
pub use scheduler::{CancelToken, Scheduler, TokioScheduler};
pub use session::{CookingSession, Panel, Recipe, RecipeCatalog, RecipeContext};
pub use timer::{TimerEngine, TimerState, extract_seconds};
pub use video::{VideoAction, VideoModal, youtube_id};
pub use voice::{
    AlertPlayer, RecognizerEvent, SpeechOutcome, SpeechRecognizer, SpeechSynthesizer,
};
