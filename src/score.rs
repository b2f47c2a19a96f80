// src/score.rs
//! # Reputation Table & Scoring
//!
//! Maps publisher names to static trust weights and combines them with
//! novelty and practicality signals into a cluster's numeric score:
//!
//! `score = reputation_sum + novelty + practicality`
//!
//! - `reputation_sum`: sum of per-publisher weights over the cluster's
//!   distinct publishers (default 1.0 for unlisted publishers).
//! - `novelty`: constant placeholder, reserved for recency-based scoring.
//! - `practicality`: 2.0 when the title matches an actionability keyword
//!   pattern, else 1.0.
//!
//! Lookup is case-insensitive with a substring fallback, so
//! "The Wall Street Journal" still resolves to "wall street journal".

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

/// Reserved for future recency-based scoring.
const NOVELTY_PLACEHOLDER: f64 = 1.0;

static ACTIONABILITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(launch(es|ed)?|available|api|tool(s)?|partnership|open[- ]?source|release[sd]?|rollout|pricing|beta)\b")
        .expect("actionability regex")
});

/// Per-publisher reputation weights, loaded from JSON or seeded.
#[derive(Debug, Clone, Deserialize)]
pub struct ReputationTable {
    #[serde(default = "default_default_weight")]
    pub default_weight: f64,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

fn default_default_weight() -> f64 {
    1.0
}

impl ReputationTable {
    /// Load from a JSON file; falls back to `default_seed()` on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Weight for a publisher: exact match, then substring fallback, then
    /// the default weight.
    pub fn weight_for(&self, publisher: &str) -> f64 {
        let p = publisher.trim().to_lowercase();

        if let Some(&w) = self.weights.get(&p) {
            return w;
        }
        for (k, &w) in &self.weights {
            if p.contains(k.as_str()) {
                return w;
            }
        }
        self.default_weight
    }

    /// Score a cluster from its distinct publishers and leader title.
    pub fn score(&self, distinct_publishers: &[String], title: &str) -> f64 {
        let reputation_sum: f64 = distinct_publishers
            .iter()
            .map(|p| self.weight_for(p))
            .sum();
        let practicality = if ACTIONABILITY_RE.is_match(title) {
            2.0
        } else {
            1.0
        };
        reputation_sum + NOVELTY_PLACEHOLDER + practicality
    }

    /// Built-in seed of known high-trust outlets for the digest's domain.
    pub fn default_seed() -> Self {
        let mut weights = HashMap::new();
        for (k, v) in [
            ("reuters", 3.0),
            ("bloomberg", 3.0),
            ("mit technology review", 3.0),
            ("ars technica", 2.5),
            ("wired", 2.5),
            ("the verge", 2.0),
            ("techcrunch", 2.0),
            ("venturebeat", 1.5),
            ("nvidia", 1.5),
            ("openai", 1.5),
        ] {
            weights.insert(k.to_string(), v);
        }
        Self {
            default_weight: 1.0,
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReputationTable {
        ReputationTable::default_seed()
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        assert!((table().weight_for("Reuters") - 3.0).abs() < 1e-9);
        assert!((table().weight_for("REUTERS") - 3.0).abs() < 1e-9);
    }

    #[test]
    fn substring_fallback() {
        assert!((table().weight_for("The Verge Tech") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn unlisted_publisher_gets_default_weight() {
        assert!((table().weight_for("smalltownblog.net") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn score_sums_reputation_novelty_practicality() {
        let t = table();
        // Reuters (3.0) + unknown (1.0) + novelty (1.0) + actionable title (2.0)
        let s = t.score(
            &["Reuters".to_string(), "smalltownblog.net".to_string()],
            "New API available for developers",
        );
        assert!((s - 7.0).abs() < 1e-9);
    }

    #[test]
    fn non_actionable_title_gets_base_practicality() {
        let t = table();
        let s = t.score(&["Reuters".to_string()], "Industry reflects on a decade of change");
        assert!((s - 5.0).abs() < 1e-9);
    }

    #[test]
    fn actionability_matches_whole_words_only() {
        assert!(ACTIONABILITY_RE.is_match("Pricing changes announced"));
        assert!(!ACTIONABILITY_RE.is_match("capital gains"));
    }
}
