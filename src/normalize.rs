// src/normalize.rs
//! Canonical title form used for similarity comparison: lowercase,
//! punctuation stripped, whitespace collapsed.

/// Normalize a title into its comparable form. Total function: never fails,
/// idempotent.
pub fn normalize(title: &str) -> String {
    let lowered = title.to_lowercase();
    let spaced: String = lowered
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
