//! Cooking session state
//!
//! The aggregate root for one cooking flow. Every field is private so the
//! step index stays in range and the conversation log stays append-only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::recipe::{Recipe, RecipeContext, Step};
use crate::video::{VideoAction, VideoModal};

/// Which list the cooking screen shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Steps,
    Ingredients,
}

/// Conversation log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// State of the active cooking flow
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookingSession {
    current_recipe: Option<Arc<Recipe>>,
    current_step_index: usize,
    recognized_text: String,
    last_ai_response: Option<String>,
    conversation_history: Vec<ConversationMessage>,
    is_response_dialog_visible: bool,
    video: VideoModal,
    panel: Panel,
}

impl CookingSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the recipe to cook and go back to the first step
    pub fn set_current_recipe(&mut self, recipe: Arc<Recipe>) {
        tracing::info!(recipe = %recipe.id, steps = recipe.steps.len(), "recipe selected");
        self.current_recipe = Some(recipe);
        self.current_step_index = 0;
    }

    #[must_use]
    pub fn current_recipe(&self) -> Option<&Arc<Recipe>> {
        self.current_recipe.as_ref()
    }

    #[must_use]
    pub const fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    /// The step currently shown, if a recipe with steps is loaded
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.current_recipe
            .as_ref()
            .and_then(|recipe| recipe.steps.get(self.current_step_index))
    }

    /// Number of steps in the current recipe (0 without one)
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.current_recipe
            .as_ref()
            .map_or(0, |recipe| recipe.steps.len())
    }

    /// Advance one step, stopping at the last
    pub fn next_step(&mut self) {
        let last = self.step_count().saturating_sub(1);
        self.current_step_index = (self.current_step_index + 1).min(last);
    }

    /// Go back one step, stopping at the first
    pub const fn previous_step(&mut self) {
        self.current_step_index = self.current_step_index.saturating_sub(1);
    }

    /// Jump to a step, clamped into range
    pub fn go_to_step(&mut self, index: usize) {
        let last = self.step_count().saturating_sub(1);
        self.current_step_index = index.min(last);
    }

    #[must_use]
    pub fn recognized_text(&self) -> &str {
        &self.recognized_text
    }

    pub fn set_recognized_text(&mut self, text: impl Into<String>) {
        self.recognized_text = text.into();
    }

    #[must_use]
    pub fn last_ai_response(&self) -> Option<&str> {
        self.last_ai_response.as_deref()
    }

    pub fn set_last_ai_response(&mut self, response: Option<String>) {
        self.last_ai_response = response;
    }

    /// Append a message to the conversation log
    pub fn add_conversation_message(
        &mut self,
        text: impl Into<String>,
        is_user: bool,
    ) -> &ConversationMessage {
        let message = ConversationMessage {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            is_user,
            timestamp: Utc::now(),
        };
        tracing::debug!(id = %message.id, is_user, text = %message.text, "conversation message");

        let index = self.conversation_history.len();
        self.conversation_history.push(message);
        &self.conversation_history[index]
    }

    #[must_use]
    pub fn conversation_history(&self) -> &[ConversationMessage] {
        &self.conversation_history
    }

    #[must_use]
    pub const fn is_dialog_visible(&self) -> bool {
        self.is_response_dialog_visible
    }

    pub const fn set_dialog_visible(&mut self, visible: bool) {
        self.is_response_dialog_visible = visible;
    }

    #[must_use]
    pub const fn video(&self) -> &VideoModal {
        &self.video
    }

    /// Show or hide the video modal
    ///
    /// Hiding also stops the player.
    pub const fn set_video_modal_visible(&mut self, visible: bool) {
        if visible {
            self.video.is_visible = true;
        } else {
            self.video.close();
        }
    }

    pub fn set_current_video_url(&mut self, url: Option<String>) {
        self.video.url = url;
    }

    pub fn apply_video_action(&mut self, action: VideoAction) {
        self.video.apply(action);
    }

    #[must_use]
    pub const fn panel(&self) -> Panel {
        self.panel
    }

    pub const fn set_panel(&mut self, panel: Panel) {
        self.panel = panel;
    }

    /// Context for a free-form question, `None` without a recipe
    #[must_use]
    pub fn recipe_context(&self) -> Option<RecipeContext> {
        self.current_recipe
            .as_ref()
            .map(|recipe| RecipeContext::new(recipe, self.current_step_index))
    }

    /// Clear everything transient and keep the selected recipe
    pub fn reset(&mut self) {
        tracing::info!(
            messages = self.conversation_history.len(),
            "cooking session reset"
        );
        *self = Self {
            current_recipe: self.current_recipe.take(),
            ..Self::default()
        };
    }
}
