//! Countdown state machine
//!
//! The engine only tracks state. It never sleeps: the owner schedules a
//! one-second tick while [`TimerEngine::should_tick`] holds and feeds each
//! expiry back through [`TimerEngine::tick`].

use serde::Serialize;

use super::duration::parse_manual_field;

/// Snapshot of the cooking timer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Countdown is running
    pub is_active: bool,
    /// Seconds left
    pub remaining_seconds: u32,
    /// Seconds staged by the last dialog
    pub duration_seconds: u32,
    /// Label shown next to the countdown
    pub description: Option<String>,
    /// Confirmation dialog is open
    pub is_confirm_dialog_visible: bool,
    /// Manual minutes/seconds entry dialog is open
    pub is_manual_entry_dialog_visible: bool,
}

/// Spoken notices at fixed remaining-time marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerNotice {
    /// 300 seconds left
    FiveMinutes,
    /// 60 seconds left
    OneMinute,
    /// 30 seconds left
    ThirtySeconds,
    /// Countdown reached zero
    Finished,
}

impl TimerNotice {
    /// Notice due at `remaining` seconds, if any
    #[must_use]
    pub const fn at(remaining: u32) -> Option<Self> {
        match remaining {
            300 => Some(Self::FiveMinutes),
            60 => Some(Self::OneMinute),
            30 => Some(Self::ThirtySeconds),
            0 => Some(Self::Finished),
            _ => None,
        }
    }

    /// Announcement text
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FiveMinutes => "残り5分です",
            Self::OneMinute => "残り1分です",
            Self::ThirtySeconds => "残り30秒です",
            Self::Finished => "タイマーが終了しました",
        }
    }

    /// Whether the audible alert loop accompanies this notice
    #[must_use]
    pub const fn plays_alert(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Seconds left after the tick
    pub remaining: u32,
    /// Notice due at this mark
    pub notice: Option<TimerNotice>,
}

/// Single cooking timer
#[derive(Debug, Default)]
pub struct TimerEngine {
    state: TimerState,
}

impl TimerEngine {
    /// Create an idle timer at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &TimerState {
        &self.state
    }

    /// Set the duration and remaining time together
    pub const fn set_duration(&mut self, seconds: u32) {
        self.state.duration_seconds = seconds;
        self.state.remaining_seconds = seconds;
    }

    /// Set the countdown label
    pub fn set_description(&mut self, description: Option<String>) {
        self.state.description = description;
    }

    /// Remaining time as `M:SS`
    #[must_use]
    pub fn format_remaining(&self) -> String {
        format_clock(self.state.remaining_seconds)
    }

    /// Stage a duration and open the confirmation dialog
    ///
    /// Does not start ticking.
    pub fn show_timer_dialog(&mut self, seconds: u32, description: Option<String>) {
        tracing::debug!(seconds, ?description, "timer staged");
        self.set_duration(seconds);
        self.set_description(description);
        self.state.is_confirm_dialog_visible = true;
    }

    /// Close the confirmation dialog without starting
    pub const fn hide_timer_dialog(&mut self) {
        self.state.is_confirm_dialog_visible = false;
    }

    /// Activate the countdown and close the confirmation dialog
    ///
    /// Accepted at zero remaining, in which case nothing ever ticks.
    pub fn start(&mut self) {
        tracing::info!(
            remaining = self.state.remaining_seconds,
            description = ?self.state.description,
            "timer started"
        );
        self.state.is_active = true;
        self.state.is_confirm_dialog_visible = false;
    }

    /// Stop ticking and keep the remaining time
    pub const fn pause(&mut self) {
        self.state.is_active = false;
    }

    /// Restore the staged duration and stop ticking
    pub const fn reset(&mut self) {
        self.state.remaining_seconds = self.state.duration_seconds;
        self.state.is_active = false;
    }

    /// Whether a tick should be scheduled
    #[must_use]
    pub const fn should_tick(&self) -> bool {
        self.state.is_active && self.state.remaining_seconds > 0
    }

    /// Advance the countdown by one second
    ///
    /// Returns `None` when the timer is not ticking (a tick that raced with a
    /// pause or reset).
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.should_tick() {
            return None;
        }

        self.state.remaining_seconds -= 1;
        let remaining = self.state.remaining_seconds;
        if remaining == 0 {
            self.state.is_active = false;
            tracing::info!("timer finished");
        }

        Some(TickOutcome {
            remaining,
            notice: TimerNotice::at(remaining),
        })
    }

    /// Open the manual entry dialog
    pub const fn show_manual_entry(&mut self) {
        self.state.is_manual_entry_dialog_visible = true;
    }

    /// Close the manual entry dialog
    pub const fn hide_manual_entry(&mut self) {
        self.state.is_manual_entry_dialog_visible = false;
    }

    /// Submit the manual entry form
    ///
    /// A positive total closes the form and stages the duration. Anything else
    /// leaves the state untouched. Returns whether a duration was staged.
    pub fn submit_manual_entry(&mut self, minutes: &str, seconds: &str) -> bool {
        let total = parse_manual_field(minutes)
            .saturating_mul(60)
            .saturating_add(parse_manual_field(seconds));

        if total == 0 {
            tracing::debug!(minutes, seconds, "ignoring empty manual timer entry");
            return false;
        }

        self.hide_manual_entry();
        self.show_timer_dialog(total, None);
        true
    }
}

/// Render seconds as `M:SS`
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
