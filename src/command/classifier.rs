//! Utterance classification
//!
//! Rules run in a fixed priority order and the first match wins:
//!
//! 1. external hook registered by the embedding screen
//! 2. video player commands (only while the video modal is open)
//! 3. timer confirm / cancel / setup
//! 4. wake word gated navigation and display commands
//! 5. free-form question for the LLM (also wake word gated)
//!
//! Rules 1-3 apply with or without a wake word. An utterance that reaches
//! rule 4 without one is dropped.

use serde::Serialize;

use super::keywords::{
    NEXT_STEP, PREVIOUS_STEP, SHOW_INGREDIENTS, SHOW_STEPS, TIMER_CANCEL, TIMER_CONFIRM,
    TIMER_TRIGGERS, VIDEO_COMMANDS,
};
use super::wake_word::WakeWordDetector;
use crate::text;
use crate::timer::extract_seconds;
use crate::video::VideoAction;

/// Step navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Advance one step
    Next,
    /// Go back one step
    Previous,
}

/// Classified meaning of one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Consumed by the external hook
    External,
    /// Video player command
    VideoControl {
        /// Player action
        action: VideoAction,
    },
    /// Start the staged timer
    TimerConfirm,
    /// Close the timer dialog
    TimerCancel,
    /// Stage a timer and open the confirmation dialog
    TimerSetup {
        /// Duration in seconds
        seconds: u32,
        /// Label, present when the duration came from the current step
        description: Option<String>,
    },
    /// Wake word with nothing after it
    Prompt {
        /// Logged utterance
        utterance: String,
    },
    /// Step navigation
    Navigate {
        /// Which way
        direction: Direction,
        /// Logged utterance
        utterance: String,
    },
    /// Switch to the ingredient list
    ShowIngredients {
        /// Logged utterance
        utterance: String,
    },
    /// Switch to the step list
    ShowSteps {
        /// Logged utterance
        utterance: String,
    },
    /// Question for the LLM
    FreeForm {
        /// Command text with the wake word stripped
        text: String,
    },
    /// Not directed at the assistant
    Noop,
}

/// Session state the rules read at classification time
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext<'a> {
    /// Description of the current recipe step
    pub current_step: Option<&'a str>,
    /// Timer confirmation dialog is open
    pub timer_dialog_open: bool,
    /// Video modal is open
    pub video_modal_open: bool,
}

/// Screen-level command handler that runs before every built-in rule
///
/// A hook that reports `true` suppresses all built-in handling for that
/// utterance, including timer and navigation commands.
pub trait CommandHook: Send {
    /// Try to handle the utterance
    fn try_handle(&mut self, text: &str) -> bool;
}

impl<F> CommandHook for F
where
    F: FnMut(&str) -> bool + Send,
{
    fn try_handle(&mut self, text: &str) -> bool {
        self(text)
    }
}

struct Utterance<'a> {
    raw: &'a str,
    folded: String,
}

type Rule = fn(&WakeWordDetector, &Utterance<'_>, &ClassifyContext<'_>) -> Option<Intent>;

const RULES: &[(&str, Rule)] = &[
    ("video", video_rule),
    ("timer", timer_rule),
    ("directed", directed_rule),
];

/// Maps utterances to intents
#[derive(Default)]
pub struct Classifier {
    wake: WakeWordDetector,
    hook: Option<Box<dyn CommandHook>>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("wake", &self.wake)
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}

impl Classifier {
    /// Create a classifier with the given wake word detector
    #[must_use]
    pub fn new(wake: WakeWordDetector) -> Self {
        Self { wake, hook: None }
    }

    /// Register the external command hook, replacing any previous one
    pub fn set_hook(&mut self, hook: Box<dyn CommandHook>) {
        self.hook = Some(hook);
    }

    /// Remove the external command hook
    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    /// Classify one finalized utterance
    pub fn classify(&mut self, raw: &str, context: &ClassifyContext<'_>) -> Intent {
        if let Some(hook) = self.hook.as_mut()
            && hook.try_handle(raw)
        {
            tracing::debug!(text = raw, "utterance handled by external hook");
            return Intent::External;
        }

        let utterance = Utterance {
            raw,
            folded: text::fold(raw),
        };

        for (name, rule) in RULES {
            if let Some(intent) = rule(&self.wake, &utterance, context) {
                tracing::debug!(rule = name, ?intent, "rule matched");
                return intent;
            }
        }

        tracing::debug!(text = raw, "utterance not directed at assistant");
        Intent::Noop
    }
}

fn video_rule(
    _wake: &WakeWordDetector,
    utterance: &Utterance<'_>,
    context: &ClassifyContext<'_>,
) -> Option<Intent> {
    if !context.video_modal_open {
        return None;
    }

    VIDEO_COMMANDS
        .iter()
        .find(|(_, keywords)| text::contains_any(&utterance.folded, keywords))
        .map(|(action, _)| Intent::VideoControl { action: *action })
}

fn timer_rule(
    _wake: &WakeWordDetector,
    utterance: &Utterance<'_>,
    context: &ClassifyContext<'_>,
) -> Option<Intent> {
    if context.timer_dialog_open {
        if text::contains_any(&utterance.folded, TIMER_CONFIRM) {
            return Some(Intent::TimerConfirm);
        }
        if text::contains_any(&utterance.folded, TIMER_CANCEL) {
            return Some(Intent::TimerCancel);
        }
    }

    if !text::contains_any(&utterance.folded, TIMER_TRIGGERS) {
        return None;
    }

    // A zero duration counts as no duration
    if let Some(seconds) = extract_seconds(utterance.raw).filter(|seconds| *seconds > 0) {
        return Some(Intent::TimerSetup {
            seconds,
            description: None,
        });
    }

    let step = context.current_step?;
    let seconds = extract_seconds(step).filter(|seconds| *seconds > 0)?;
    Some(Intent::TimerSetup {
        seconds,
        description: Some(format!("{step}のタイマー")),
    })
}

fn directed_rule(
    wake: &WakeWordDetector,
    utterance: &Utterance<'_>,
    _context: &ClassifyContext<'_>,
) -> Option<Intent> {
    let matched = wake.detect(utterance.raw)?;
    let command = &matched.folded_command;

    if command.is_empty() {
        return Some(Intent::Prompt {
            utterance: matched.utterance,
        });
    }

    let intent = if text::contains_any(command, NEXT_STEP) {
        Intent::Navigate {
            direction: Direction::Next,
            utterance: matched.utterance,
        }
    } else if text::contains_any(command, PREVIOUS_STEP) {
        Intent::Navigate {
            direction: Direction::Previous,
            utterance: matched.utterance,
        }
    } else if text::contains_any(command, SHOW_INGREDIENTS) {
        Intent::ShowIngredients {
            utterance: matched.utterance,
        }
    } else if text::contains_any(command, SHOW_STEPS) {
        Intent::ShowSteps {
            utterance: matched.utterance,
        }
    } else {
        Intent::FreeForm {
            text: matched.command,
        }
    };

    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        Classifier::default().classify(text, &ClassifyContext::default())
    }

    #[test]
    fn test_undirected_speech_is_dropped() {
        assert_eq!(classify("こんにちは"), Intent::Noop);
        assert_eq!(classify("ありがとうございます"), Intent::Noop);
    }

    #[test]
    fn test_navigation_order() {
        assert_eq!(
            classify("アイリ次へ"),
            Intent::Navigate {
                direction: Direction::Next,
                utterance: "AIry次へ".to_string()
            }
        );
        assert_eq!(
            classify("アイリ戻って"),
            Intent::Navigate {
                direction: Direction::Previous,
                utterance: "AIry戻って".to_string()
            }
        );
        // "次" is tested before "材料"
        assert!(matches!(
            classify("アイリ次の材料"),
            Intent::Navigate {
                direction: Direction::Next,
                ..
            }
        ));
    }

    #[test]
    fn test_display_commands() {
        assert!(matches!(classify("えりざいりょう"), Intent::ShowIngredients { .. }));
        assert!(matches!(classify("アイリ Ingredient list"), Intent::ShowIngredients { .. }));
        assert!(matches!(classify("アイリ手順を見せて"), Intent::ShowSteps { .. }));
    }

    #[test]
    fn test_prompt_and_free_form() {
        assert_eq!(
            classify("アイリ"),
            Intent::Prompt {
                utterance: "AIry".to_string()
            }
        );
        assert_eq!(
            classify("アイリ 塩はどれくらい？"),
            Intent::FreeForm {
                text: "塩はどれくらい？".to_string()
            }
        );
    }

    #[test]
    fn test_zero_duration_falls_back_to_step() {
        let mut classifier = Classifier::default();
        let context = ClassifyContext {
            current_step: Some("3分焼く"),
            ..ClassifyContext::default()
        };

        assert_eq!(
            classifier.classify("タイマー0分", &context),
            Intent::TimerSetup {
                seconds: 180,
                description: Some("3分焼くのタイマー".to_string())
            }
        );
    }

    #[test]
    fn test_hook_runs_first() {
        let mut classifier = Classifier::default();
        classifier.set_hook(Box::new(|text: &str| text.contains("次")));

        assert_eq!(
            classifier.classify("アイリ次へ", &ClassifyContext::default()),
            Intent::External
        );
        assert!(matches!(
            classifier.classify("アイリ前へ", &ClassifyContext::default()),
            Intent::Navigate { .. }
        ));

        classifier.clear_hook();
        assert!(matches!(
            classifier.classify("アイリ次へ", &ClassifyContext::default()),
            Intent::Navigate { .. }
        ));
    }
}
