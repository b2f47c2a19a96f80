// src/model.rs
//! Core data shapes shared across the pipeline: feed configuration,
//! fetched/mapped entries, persisted digest items, and feed health records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One configured feed. Loaded at process start, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub genre_hint: Option<String>,
}

/// The as-fetched shape of one feed entry, after XML-level validation
/// (title and link present). Transient; discarded after mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub excerpt: Option<String>,
}

/// One entry after publisher derivation and relevance filtering.
/// Lives only within a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappedEntry {
    pub title: String,
    pub url: String,
    pub publisher: String,
    pub published_at: DateTime<Utc>,
    pub excerpt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Uplift,
    Opportunity,
    Caution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Policy,
    Research,
    Product,
    Business,
    Safety,
    General,
}

/// Pointer back to one underlying article inside a digest item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub publisher: String,
    pub published_at: DateTime<Utc>,
}

/// The persisted output of one pipeline run, keyed by civil date.
/// Never mutated individually; the whole set for a date is replaced on
/// rebuild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DigestItem {
    pub id: String,
    pub date_iso: String,
    pub genre: Genre,
    pub mood: Mood,
    pub title: String,
    pub summary: String,
    pub bullets: Vec<String>,
    pub sources: Vec<SourceRef>,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Healthy,
    Degraded,
    Broken,
    Unknown,
}

/// Operational record for one configured feed, keyed by url.
/// Written exclusively by the feed health monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedHealthRecord {
    pub feed_url: String,
    pub feed_label: String,
    pub status: FeedStatus,
    pub last_checked_at: DateTime<Utc>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error_message: Option<String>,
    pub last_response_time_ms: u64,
    pub last_item_count: usize,
}
