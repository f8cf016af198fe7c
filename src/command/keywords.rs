//! Keyword tables for command matching
//!
//! All entries are stored folded (half-width, lowercase) so they can be
//! compared against [`crate::text::fold`] output directly.

use crate::video::VideoAction;

/// Words that mark an utterance as a timer request
pub const TIMER_TRIGGERS: &[&str] = &["タイマー", "timer", "タイム"];

/// Confirmation words while the timer dialog is open
pub const TIMER_CONFIRM: &[&str] = &["ok", "okay", "はい", "よし", "開始", "スタート", "start"];

/// Cancellation words while the timer dialog is open
pub const TIMER_CANCEL: &[&str] = &["cancel", "キャンセル", "やめ", "いいえ", "ダメ", "no"];

/// Advance to the next step
pub const NEXT_STEP: &[&str] = &["次", "次へ", "進める"];

/// Go back one step
pub const PREVIOUS_STEP: &[&str] = &["戻る", "前", "前へ", "戻って"];

/// Show the ingredient list
pub const SHOW_INGREDIENTS: &[&str] = &["材料", "ざいりょう", "ingredient"];

/// Show the step list
pub const SHOW_STEPS: &[&str] = &["手順", "てじゅん", "ステップ", "step"];

/// Video player commands, in evaluation order
///
/// Play keywords name the verb form because a bare `再生` also opens phrases
/// like `再生を止めて`.
pub const VIDEO_COMMANDS: &[(VideoAction, &[&str])] = &[
    (
        VideoAction::Play,
        &["再生して", "再生する", "再生開始", "再開", "プレイ", "play"],
    ),
    (
        VideoAction::Pause,
        &["一時停止", "停止", "止め", "ストップ", "ポーズ", "pause", "stop"],
    ),
    (VideoAction::TogglePlay, &["切り替え", "toggle"]),
    (
        VideoAction::ToggleFullscreen,
        &["全画面", "フルスクリーン", "fullscreen"],
    ),
    (VideoAction::Close, &["閉じ", "とじて", "close", "終了"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text;

    #[test]
    fn test_tables_are_folded() {
        let tables: [&[&str]; 7] = [
            TIMER_TRIGGERS,
            TIMER_CONFIRM,
            TIMER_CANCEL,
            NEXT_STEP,
            PREVIOUS_STEP,
            SHOW_INGREDIENTS,
            SHOW_STEPS,
        ];
        for keyword in tables
            .iter()
            .flat_map(|table| table.iter())
            .chain(VIDEO_COMMANDS.iter().flat_map(|(_, words)| words.iter()))
        {
            assert_eq!(text::fold(keyword), *keyword);
        }
    }
}
