//! Text folding shared by keyword and duration matching
//!
//! Recognizers return a mix of full-width and half-width Latin characters
//! ("ＯＫ", "５分"), so every comparison happens on folded text: full-width
//! ASCII mapped to its half-width form, then lowercased.

/// Fold a string for matching
#[must_use]
pub fn fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        push_folded(ch, &mut folded);
    }
    folded
}

/// Append the folded form of a single character
pub fn push_folded(ch: char, out: &mut String) {
    out.extend(fold_width(ch).to_lowercase());
}

/// Check whether folded text contains any of the (already folded) keywords
#[must_use]
pub fn contains_any(folded: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| folded.contains(keyword))
}

fn fold_width(ch: char) -> char {
    match ch {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(u32::from(ch) - 0xFEE0).unwrap_or(ch),
        '\u{3000}' => ' ',
        _ => ch,
    }
}
