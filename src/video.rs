//! Recipe video modal
//!
//! LLM answers may carry a video link. The modal opens once the spoken answer
//! has finished and is then driven by voice (play, pause, fullscreen, close).

use serde::Serialize;
use url::Url;

/// Player command recognized by voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoAction {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Flip between playing and paused
    TogglePlay,
    /// Enter or leave fullscreen
    ToggleFullscreen,
    /// Close the modal
    Close,
}

/// Video modal state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoModal {
    /// Modal is shown
    pub is_visible: bool,
    /// Video link from the last answer
    pub url: Option<String>,
    /// Player is playing
    pub playing: bool,
    /// Player is fullscreen
    pub fullscreen: bool,
}

impl VideoModal {
    /// Apply a voice command to the player
    pub fn apply(&mut self, action: VideoAction) {
        tracing::debug!(?action, "video command");
        match action {
            VideoAction::Play => self.playing = true,
            VideoAction::Pause => self.playing = false,
            VideoAction::TogglePlay => self.playing = !self.playing,
            VideoAction::ToggleFullscreen => {
                if self.fullscreen {
                    self.fullscreen = false;
                } else {
                    // Entering fullscreen also starts playback
                    self.fullscreen = true;
                    self.playing = true;
                }
            }
            VideoAction::Close => self.close(),
        }
    }

    /// Hide the modal and stop the player (idempotent)
    pub const fn close(&mut self) {
        self.is_visible = false;
        self.playing = false;
        self.fullscreen = false;
    }

    /// `YouTube` id of the current link
    #[must_use]
    pub fn video_id(&self) -> Option<String> {
        self.url.as_deref().and_then(youtube_id)
    }
}

/// Extract the `YouTube` video id from a link or a bare id
///
/// Accepts `watch?v=`, `embed/` and `youtu.be/` links, with or without a
/// scheme, and bare 11-character ids.
#[must_use]
pub fn youtube_id(link: &str) -> Option<String> {
    let link = link.trim();
    let candidate = if link.contains("://") {
        link.to_string()
    } else {
        format!("https://{link}")
    };

    if let Ok(parsed) = Url::parse(&candidate)
        && let Some(id) = id_from_url(&parsed)
    {
        return Some(id);
    }

    is_video_id(link).then(|| link.to_string())
}

fn id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let mut segments = url.path_segments()?;

    let id = match host {
        "youtu.be" => segments.next()?.to_string(),
        "youtube.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?,
            "embed" => segments.next()?.to_string(),
            _ => return None,
        },
        _ => return None,
    };

    is_video_id(&id).then_some(id)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
