//! TOML configuration file loading
//!
//! Supports `~/.config/airy/config.toml` as a persistent config source.
//! All fields are optional. The file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AiryConfigFile {
    /// Recognition and speech configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Wake word configuration
    #[serde(default)]
    pub wake: WakeFileConfig,

    /// Cooking timer configuration
    #[serde(default)]
    pub timer: TimerFileConfig,

    /// LLM query service configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Path to a JSON recipe catalog
    #[serde(default)]
    pub recipes: Option<String>,
}

/// Recognition and speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Recognizer and synthesizer locale (e.g. "ja-JP")
    pub locale: Option<String>,

    /// Quiet period before a transcript is classified
    pub debounce_ms: Option<u64>,

    /// Pause between opening the response dialog and speaking
    pub speak_delay_ms: Option<u64>,

    /// Wait before restarting the recognizer after an error
    pub error_retry_ms: Option<u64>,
}

/// Wake word configuration
#[derive(Debug, Default, Deserialize)]
pub struct WakeFileConfig {
    pub words: Option<Vec<String>>,
    pub ambiguous: Option<Vec<String>>,
    pub deny_prefixes: Option<Vec<String>>,

    /// Name written to the conversation log in place of the spoken wake word
    pub marker: Option<String>,
}

/// Cooking timer configuration
#[derive(Debug, Default, Deserialize)]
pub struct TimerFileConfig {
    /// Times the finish alert plays
    pub alert_repeat: Option<u32>,
}

/// LLM query service configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// HTTP endpoint of the callable function
    pub endpoint: Option<String>,

    /// Request timeout
    pub timeout_secs: Option<u64>,
}

/// Load config file from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> AiryConfigFile {
    let Some(path) = config_file_path() else {
        return AiryConfigFile::default();
    };

    if !path.exists() {
        return AiryConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            AiryConfigFile::default()
        }
    }
}

/// Read and parse a specific config file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<AiryConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Get the config file path (`~/.config/airy/config.toml`)
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("airy").join("config.toml"))
}
