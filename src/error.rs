//! Error types for the AIry voice core

use thiserror::Error;

/// Result type alias for AIry voice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the AIry voice core
///
/// None of these escape the assistant runtime: collaborator failures are
/// converted into events (recognizer error strings, spoken apologies) before
/// they reach the session state.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech recognizer error (device, permission, network)
    #[error("recognizer error: {0}")]
    Recognizer(String),

    /// LLM query service error
    #[error("llm error: {0}")]
    Llm(String),

    /// Audio alert error
    #[error("audio error: {0}")]
    Audio(String),

    /// Recipe catalog error
    #[error("recipe error: {0}")]
    Recipe(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
