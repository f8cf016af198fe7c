//! Duration extraction from spoken or typed text

use std::sync::LazyLock;

use regex::Regex;

use crate::text;

static MINUTES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*(分|min)").expect("valid regex"));

static SECONDS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*(秒|sec)").expect("valid regex"));

/// Extract a duration in seconds from free text
///
/// Recognizes "<n>分" / "<n> min" and "<n>秒" / "<n> sec" (case and width
/// insensitive) and sums them. Returns `None` when neither unit is present.
///
/// ```
/// use airy_voice::timer::extract_seconds;
///
/// assert_eq!(extract_seconds("タイマー5分"), Some(300));
/// assert_eq!(extract_seconds("3分30秒煮る"), Some(210));
/// assert_eq!(extract_seconds("弱火で煮る"), None);
/// ```
#[must_use]
pub fn extract_seconds(input: &str) -> Option<u32> {
    let folded = text::fold(input);
    let minutes = first_number(&MINUTES_PATTERN, &folded);
    let seconds = first_number(&SECONDS_PATTERN, &folded);

    if minutes.is_none() && seconds.is_none() {
        return None;
    }

    Some(
        minutes
            .unwrap_or(0)
            .saturating_mul(60)
            .saturating_add(seconds.unwrap_or(0)),
    )
}

/// Parse one field of the manual entry dialog
///
/// Blank, non-numeric and negative input count as zero.
#[must_use]
pub fn parse_manual_field(input: &str) -> u32 {
    let trimmed = text::fold(input.trim());
    trimmed
        .parse::<i64>()
        .ok()
        .map_or(0, |value| u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

fn first_number(pattern: &Regex, folded: &str) -> Option<u32> {
    let captures = pattern.captures(folded)?;
    let digits = captures.get(1)?.as_str();
    // Saturate absurdly long digit strings instead of dropping them
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}
