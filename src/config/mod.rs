//! Configuration management for the AIry voice core

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::{
    DEFAULT_AMBIGUOUS_WAKE_WORDS, DEFAULT_DENY_PREFIXES, DEFAULT_MARKER, DEFAULT_WAKE_WORDS,
};
use crate::voice::DEFAULT_ALERT_REPEAT;
use crate::{Error, Result};

/// Default recognizer and synthesizer locale
pub const DEFAULT_LOCALE: &str = "ja-JP";

/// Default quiet period before a transcript is classified
pub const DEFAULT_DEBOUNCE_MS: u64 = 800;

/// Default pause between opening the response dialog and speaking
pub const DEFAULT_SPEAK_DELAY_MS: u64 = 100;

/// Default wait before restarting the recognizer after an error
pub const DEFAULT_ERROR_RETRY_MS: u64 = 1000;

/// Default LLM request timeout
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// AIry voice configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Recognition and speech configuration
    pub voice: VoiceConfig,

    /// Wake word configuration
    pub wake: WakeConfig,

    /// Cooking timer configuration
    pub timer: TimerConfig,

    /// LLM query service configuration
    pub llm: LlmConfig,

    /// JSON recipe catalog
    /// Set via `AIRY_RECIPES` env var
    pub recipes_path: Option<PathBuf>,
}

/// Recognition and speech configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConfig {
    /// Set via `AIRY_LOCALE` env var
    pub locale: String,

    /// Set via `AIRY_DEBOUNCE_MS` env var
    pub debounce: Duration,

    pub speak_delay: Duration,

    pub error_retry: Duration,
}

/// Wake word configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeConfig {
    pub words: Vec<String>,
    pub ambiguous: Vec<String>,
    pub deny_prefixes: Vec<String>,
    pub marker: String,
}

/// Cooking timer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    /// Times the finish alert plays
    pub alert_repeat: u32,
}

/// LLM query service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Set via `AIRY_LLM_URL` env var. Without one, questions get the apology.
    pub endpoint: Option<String>,

    pub timeout: Duration,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            speak_delay: Duration::from_millis(DEFAULT_SPEAK_DELAY_MS),
            error_retry: Duration::from_millis(DEFAULT_ERROR_RETRY_MS),
        }
    }
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            words: to_owned(DEFAULT_WAKE_WORDS),
            ambiguous: to_owned(DEFAULT_AMBIGUOUS_WAKE_WORDS),
            deny_prefixes: to_owned(DEFAULT_DENY_PREFIXES),
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            alert_repeat: DEFAULT_ALERT_REPEAT,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment and the default config file
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load() -> Result<Self> {
        Self::resolve(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Load configuration from environment and a specific config file
    ///
    /// Unlike [`Self::load`], a missing or malformed file is an error.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or the
    /// configuration is invalid
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::resolve(file::read_config_file(path)?, |key| std::env::var(key).ok())
    }

    /// Merge environment, file and defaults (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn resolve(
        fc: file::AiryConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let voice = VoiceConfig {
            locale: env("AIRY_LOCALE")
                .or(fc.voice.locale)
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            debounce: Duration::from_millis(
                env("AIRY_DEBOUNCE_MS")
                    .and_then(|s| s.parse().ok())
                    .or(fc.voice.debounce_ms)
                    .unwrap_or(DEFAULT_DEBOUNCE_MS),
            ),
            speak_delay: Duration::from_millis(
                fc.voice.speak_delay_ms.unwrap_or(DEFAULT_SPEAK_DELAY_MS),
            ),
            error_retry: Duration::from_millis(
                fc.voice.error_retry_ms.unwrap_or(DEFAULT_ERROR_RETRY_MS),
            ),
        };

        let defaults = WakeConfig::default();
        let wake = WakeConfig {
            words: fc.wake.words.unwrap_or(defaults.words),
            ambiguous: fc.wake.ambiguous.unwrap_or(defaults.ambiguous),
            deny_prefixes: fc.wake.deny_prefixes.unwrap_or(defaults.deny_prefixes),
            marker: fc.wake.marker.unwrap_or(defaults.marker),
        };

        let timer = TimerConfig {
            alert_repeat: fc.timer.alert_repeat.unwrap_or(DEFAULT_ALERT_REPEAT),
        };

        let llm = LlmConfig {
            endpoint: env("AIRY_LLM_URL")
                .or(fc.llm.endpoint)
                .filter(|url| !url.trim().is_empty()),
            timeout: Duration::from_secs(fc.llm.timeout_secs.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS)),
        };

        let recipes_path = env("AIRY_RECIPES").or(fc.recipes).map(PathBuf::from);

        let config = Self {
            voice,
            wake,
            timer,
            llm,
            recipes_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the assistant relies on
    ///
    /// # Errors
    ///
    /// Returns error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.voice.locale.trim().is_empty() {
            return Err(Error::Config("voice.locale must not be empty".to_string()));
        }
        if self.voice.debounce.is_zero() {
            return Err(Error::Config("voice.debounce_ms must be positive".to_string()));
        }
        if self.wake.words.iter().chain(&self.wake.ambiguous).all(|w| w.trim().is_empty()) {
            return Err(Error::Config("wake.words must list at least one wake word".to_string()));
        }
        if self.timer.alert_repeat == 0 {
            return Err(Error::Config("timer.alert_repeat must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::file::AiryConfigFile;
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(AiryConfigFile::default(), no_env).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.voice.locale, "ja-JP");
        assert_eq!(config.voice.debounce, Duration::from_millis(800));
        assert_eq!(config.voice.speak_delay, Duration::from_millis(100));
        assert_eq!(config.timer.alert_repeat, 5);
        assert!(config.wake.words.contains(&"アイリ".to_string()));
        assert_eq!(config.wake.marker, "AIry");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut fc = AiryConfigFile::default();
        fc.voice.locale = Some("en-US".to_string());
        fc.voice.debounce_ms = Some(500);
        fc.llm.endpoint = Some("https://file.example/llm".to_string());

        let config = Config::resolve(fc, |key| match key {
            "AIRY_DEBOUNCE_MS" => Some("650".to_string()),
            "AIRY_LLM_URL" => Some("https://env.example/llm".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.voice.locale, "en-US");
        assert_eq!(config.voice.debounce, Duration::from_millis(650));
        assert_eq!(config.llm.endpoint.as_deref(), Some("https://env.example/llm"));
    }

    #[test]
    fn test_unparsable_env_falls_back() {
        let config = Config::resolve(AiryConfigFile::default(), |key| {
            (key == "AIRY_DEBOUNCE_MS").then(|| "soon".to_string())
        })
        .unwrap();

        assert_eq!(config.voice.debounce, Duration::from_millis(800));
    }

    #[test]
    fn test_blank_endpoint_is_unset() {
        let mut fc = AiryConfigFile::default();
        fc.llm.endpoint = Some("  ".to_string());

        let config = Config::resolve(fc, no_env).unwrap();
        assert!(config.llm.endpoint.is_none());
    }

    #[test]
    fn test_validation() {
        let mut fc = AiryConfigFile::default();
        fc.timer.alert_repeat = Some(0);
        assert!(Config::resolve(fc, no_env).is_err());

        let mut fc = AiryConfigFile::default();
        fc.wake.words = Some(Vec::new());
        fc.wake.ambiguous = Some(Vec::new());
        assert!(Config::resolve(fc, no_env).is_err());

        let mut fc = AiryConfigFile::default();
        fc.voice.debounce_ms = Some(0);
        assert!(Config::resolve(fc, no_env).is_err());
    }
}
