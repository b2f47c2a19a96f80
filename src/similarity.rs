// src/similarity.rs
//! Approximate title similarity via trigram overlap (Jaccard on the sets
//! of overlapping 3-character substrings of the normalized strings).

use std::collections::HashSet;

use crate::normalize::normalize;

/// All overlapping 3-character windows of `s` (already normalized).
/// Strings shorter than 3 characters yield the empty set.
pub fn trigrams(s: &str) -> HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return HashSet::new();
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

/// Symmetric similarity in `[0, 1]` between two raw titles.
///
/// Both titles are normalized first. When both trigram sets are empty
/// (normalized strings shorter than 3 chars), similarity is 1.0 for equal
/// normalized strings and 0.0 otherwise.
pub fn similarity(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);
    let ta = trigrams(&na);
    let tb = trigrams(&nb);

    if ta.is_empty() && tb.is_empty() {
        return if na == nb { 1.0 } else { 0.0 };
    }

    let intersection = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
