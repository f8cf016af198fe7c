//! Wake word detection
//!
//! Navigation commands and free-form questions must begin with the
//! assistant's name. Recognizers spell "アイリ" several ways, so a handful of
//! variants are accepted. The bare "あり" prefix is accepted too, unless the
//! utterance starts with one of a few everyday words ("ありがとう", ...).
//!
//! The "あり" rule is a prefix heuristic: anything else starting with "あり"
//! self-triggers.

use crate::config::WakeConfig;
use crate::text;
use crate::{Error, Result};

/// Accepted spellings of the assistant's name
pub const DEFAULT_WAKE_WORDS: &[&str] = &["アイリ", "あいり", "エリ", "えり", "エアリ", "えあり"];

/// Wake words that are also common word prefixes
pub const DEFAULT_AMBIGUOUS_WAKE_WORDS: &[&str] = &["あり"];

/// Words that disqualify an ambiguous wake word
pub const DEFAULT_DENY_PREFIXES: &[&str] = &[
    "ありがとう",
    "ありました",
    "ありませ",
    "ありゃ",
    "ありゃしない",
    "ありえ",
];

/// Canonical name substituted for the spoken wake word in the log
pub const DEFAULT_MARKER: &str = "AIry";

/// A directed utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeMatch {
    /// The wake word that matched (folded)
    pub wake_word: String,
    /// Utterance with the wake word replaced by the canonical marker
    pub utterance: String,
    /// Remaining command text, trimmed
    pub command: String,
    /// Folded command text for keyword matching
    pub folded_command: String,
}

/// Detects wake words at the start of transcripts
#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    wake_words: Vec<String>,
    ambiguous: Vec<String>,
    deny_prefixes: Vec<String>,
    marker: String,
}

impl WakeWordDetector {
    /// Create a new wake word detector
    ///
    /// # Arguments
    ///
    /// * `wake_words` - Names that always wake the assistant
    /// * `ambiguous` - Names checked only after `wake_words`, guarded by `deny_prefixes`
    /// * `deny_prefixes` - Everyday words that must not trigger an ambiguous name
    /// * `marker` - Canonical name written to the conversation log
    ///
    /// # Errors
    ///
    /// Returns error if no wake word remains after normalization
    pub fn new(
        wake_words: Vec<String>,
        ambiguous: Vec<String>,
        deny_prefixes: Vec<String>,
        marker: String,
    ) -> Result<Self> {
        let wake_words = normalize(wake_words);
        let ambiguous = normalize(ambiguous);
        let deny_prefixes = normalize(deny_prefixes);

        if wake_words.is_empty() && ambiguous.is_empty() {
            return Err(Error::Config("at least one wake word is required".to_string()));
        }

        tracing::debug!(?wake_words, ?ambiguous, "wake word detector initialized");

        Ok(Self {
            wake_words,
            ambiguous,
            deny_prefixes,
            marker,
        })
    }

    /// Create a detector from the `[wake]` configuration section
    ///
    /// # Errors
    ///
    /// Returns error if the configuration lists no wake words
    pub fn from_config(config: &WakeConfig) -> Result<Self> {
        Self::new(
            config.words.clone(),
            config.ambiguous.clone(),
            config.deny_prefixes.clone(),
            config.marker.clone(),
        )
    }

    /// Check whether a transcript starts with a wake word
    #[must_use]
    pub fn detect(&self, transcript: &str) -> Option<WakeMatch> {
        let raw = transcript.trim();
        let folded = text::fold(raw);

        let wake_word = self
            .wake_words
            .iter()
            .find(|word| folded.starts_with(word.as_str()))
            .or_else(|| {
                self.ambiguous
                    .iter()
                    .find(|word| folded.starts_with(word.as_str()) && !self.is_denied(&folded))
            })?;

        let rest = strip_folded_prefix(raw, wake_word);
        let command = rest.trim().to_string();

        tracing::info!(wake_word = %wake_word, command = %command, "wake word detected");

        Some(WakeMatch {
            wake_word: wake_word.clone(),
            utterance: format!("{}{rest}", self.marker),
            folded_command: text::fold(&command),
            command,
        })
    }

    /// Get the configured wake words
    #[must_use]
    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }

    /// Get the canonical marker
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn is_denied(&self, folded: &str) -> bool {
        self.deny_prefixes
            .iter()
            .any(|prefix| folded.starts_with(prefix.as_str()))
    }
}

impl Default for WakeWordDetector {
    fn default() -> Self {
        let config = WakeConfig::default();
        Self {
            wake_words: normalize(config.words),
            ambiguous: normalize(config.ambiguous),
            deny_prefixes: normalize(config.deny_prefixes),
            marker: config.marker,
        }
    }
}

fn normalize(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|word| text::fold(word.trim()))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Slice of `raw` that follows a prefix matched on its folded form
fn strip_folded_prefix<'a>(raw: &'a str, folded_prefix: &str) -> &'a str {
    let mut consumed = String::new();
    for (index, ch) in raw.char_indices() {
        if consumed.len() >= folded_prefix.len() {
            return &raw[index..];
        }
        text::push_folded(ch, &mut consumed);
    }
    ""
}
