// src/classify.rs
//! Keyword-table classification of a cluster's representative entry into a
//! mood and a genre. Pure, deterministic, total; no ML, no external calls.

use crate::model::{Genre, Mood};

/// Caution keywords are checked before opportunity keywords; first match
/// wins, default is uplift.
const CAUTION_KEYWORDS: &[&str] = &[
    "risk",
    "ban",
    "breach",
    "lawsuit",
    "warning",
    "concern",
    "layoff",
    "hack",
    "leak",
    "fraud",
    "outage",
    "recall",
    "vulnerability",
    "fine",
    "investigation",
    "scam",
    "shutdown",
];

const OPPORTUNITY_KEYWORDS: &[&str] = &[
    "launch",
    "partnership",
    "open",
    "release",
    "funding",
    "available",
    "expands",
    "integration",
    "hiring",
    "invest",
    "unveil",
    "debut",
    "rollout",
];

/// Ordered genre table; the first genre whose keyword list matches wins.
const GENRE_TABLE: &[(Genre, &[&str])] = &[
    (
        Genre::Policy,
        &[
            "regulation",
            "policy",
            "law",
            "government",
            "senate",
            "congress",
            "parliament",
            "court",
            "ruling",
            "legislation",
        ],
    ),
    (
        Genre::Safety,
        &[
            "safety",
            "alignment",
            "breach",
            "security",
            "privacy",
            "risk",
        ],
    ),
    (
        Genre::Research,
        &[
            "research",
            "paper",
            "study",
            "breakthrough",
            "benchmark",
            "dataset",
            "scientists",
        ],
    ),
    (
        Genre::Business,
        &[
            "funding",
            "acquisition",
            "acquires",
            "ipo",
            "revenue",
            "valuation",
            "partnership",
            "startup",
            "invest",
        ],
    ),
    (
        Genre::Product,
        &[
            "launch",
            "tool",
            "app",
            "feature",
            "api",
            "model",
            "release",
            "update",
            "beta",
        ],
    ),
];

fn combined_lower(title: &str, excerpt: &str) -> String {
    format!("{} {}", title, excerpt).to_lowercase()
}

pub fn classify_mood(title: &str, excerpt: &str) -> Mood {
    let text = combined_lower(title, excerpt);
    if CAUTION_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Mood::Caution;
    }
    if OPPORTUNITY_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Mood::Opportunity;
    }
    Mood::Uplift
}

pub fn classify_genre(title: &str, excerpt: &str) -> Genre {
    let text = combined_lower(title, excerpt);
    for (genre, keywords) in GENRE_TABLE {
        if keywords.iter().any(|k| text.contains(k)) {
            return *genre;
        }
    }
    Genre::General
}
