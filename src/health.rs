// src/health.rs
//! Feed health monitoring: probes every configured feed with a short
//! timeout, keeps one `FeedHealthRecord` per feed url, and suggests
//! replacement URLs for persistently broken feeds. Runs independently of
//! the digest pipeline and only ever writes health records.

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::fetch::FeedFetcher;
use crate::model::{FeedHealthRecord, FeedSource, FeedStatus};
use crate::store::HealthStore;

/// Feeds with this many consecutive failures count as broken even if the
/// most recent probe squeaked through as degraded.
pub const BROKEN_FAILURE_FLOOR: u32 = 3;

const COMMON_FEED_PATHS: &[&str] = &[
    "/feed",
    "/rss",
    "/feed.xml",
    "/rss.xml",
    "/atom.xml",
    "/index.xml",
];

#[derive(Debug, Clone, Serialize)]
pub struct FeedCheckResult {
    pub label: String,
    pub url: String,
    pub status: FeedStatus,
    pub response_time_ms: u64,
    pub item_count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub broken: usize,
    pub per_feed_results: Vec<FeedCheckResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokenFeedInfo {
    pub label: String,
    pub url: String,
    pub consecutive_failures: u32,
    pub last_error_message: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedHealthOverview {
    pub total: usize,
    pub checked: usize,
    pub never_checked: usize,
    pub by_status: HashMap<String, usize>,
    pub avg_response_time_ms: Option<f64>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReplacementSuggestion {
    pub label: String,
    pub url: String,
    pub reason: String,
}

pub struct FeedHealthMonitor {
    config: Arc<AppConfig>,
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<dyn HealthStore>,
}

impl FeedHealthMonitor {
    pub fn new(
        config: Arc<AppConfig>,
        fetcher: Arc<dyn FeedFetcher>,
        store: Arc<dyn HealthStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    /// Probe every configured feed once and upsert its health record.
    pub async fn validate_all_feeds(&self) -> Result<HealthSummary> {
        let timeout = Duration::from_secs(self.config.health_timeout_secs);
        let latency_budget_ms = self.config.health_latency_budget_ms;

        let mut per_feed_results = Vec::with_capacity(self.config.feeds.len());
        for feed in &self.config.feeds {
            let result = self.check_one(feed, timeout, latency_budget_ms).await;
            self.upsert_record(feed, &result)?;
            per_feed_results.push(result);
        }

        let count_of = |s: FeedStatus| per_feed_results.iter().filter(|r| r.status == s).count();
        let summary = HealthSummary {
            total: per_feed_results.len(),
            healthy: count_of(FeedStatus::Healthy),
            degraded: count_of(FeedStatus::Degraded),
            broken: count_of(FeedStatus::Broken),
            per_feed_results,
        };

        counter!("feedcheck_runs_total").increment(1);
        gauge!("feedcheck_broken_total").set(summary.broken as f64);
        info!(
            total = summary.total,
            healthy = summary.healthy,
            degraded = summary.degraded,
            broken = summary.broken,
            "feed health check complete"
        );
        Ok(summary)
    }

    async fn check_one(
        &self,
        feed: &FeedSource,
        timeout: Duration,
        latency_budget_ms: u64,
    ) -> FeedCheckResult {
        let t0 = std::time::Instant::now();
        let outcome = tokio::time::timeout(timeout, self.fetcher.fetch(feed)).await;
        let response_time_ms = t0.elapsed().as_millis() as u64;

        let (status, item_count, error) = match outcome {
            Ok(Ok(items)) if items.is_empty() => (
                FeedStatus::Degraded,
                0,
                Some("feed returned zero items".to_string()),
            ),
            Ok(Ok(items)) if response_time_ms > latency_budget_ms => (
                FeedStatus::Degraded,
                items.len(),
                Some(format!("latency {response_time_ms}ms over budget")),
            ),
            Ok(Ok(items)) => (FeedStatus::Healthy, items.len(), None),
            Ok(Err(e)) => {
                warn!(error = ?e, feed = %feed.label, "feed probe failed");
                (FeedStatus::Broken, 0, Some(format!("{e:#}")))
            }
            Err(_) => (
                FeedStatus::Broken,
                0,
                Some(format!("timed out after {}s", timeout.as_secs())),
            ),
        };

        FeedCheckResult {
            label: feed.label.clone(),
            url: feed.url.clone(),
            status,
            response_time_ms,
            item_count,
            error,
        }
    }

    fn upsert_record(&self, feed: &FeedSource, result: &FeedCheckResult) -> Result<()> {
        let now = Utc::now();
        let prev = self.store.get(&feed.url)?;

        let healthy = result.status == FeedStatus::Healthy;
        let consecutive_failures = if healthy {
            0
        } else {
            prev.as_ref().map_or(0, |p| p.consecutive_failures) + 1
        };
        let last_success_at = if healthy {
            Some(now)
        } else {
            prev.and_then(|p| p.last_success_at)
        };

        self.store.upsert(FeedHealthRecord {
            feed_url: feed.url.clone(),
            feed_label: feed.label.clone(),
            status: result.status,
            last_checked_at: now,
            last_success_at,
            consecutive_failures,
            last_error_message: result.error.clone(),
            last_response_time_ms: result.response_time_ms,
            last_item_count: result.item_count,
        })
    }

    /// Feeds currently broken, or degraded long enough to treat as broken.
    pub fn get_broken_feeds(&self) -> Result<Vec<BrokenFeedInfo>> {
        let out = self
            .store
            .all()?
            .into_iter()
            .filter(|r| {
                r.status == FeedStatus::Broken || r.consecutive_failures >= BROKEN_FAILURE_FLOOR
            })
            .map(|r| BrokenFeedInfo {
                label: r.feed_label,
                url: r.feed_url,
                consecutive_failures: r.consecutive_failures,
                last_error_message: r.last_error_message,
                last_success_at: r.last_success_at,
            })
            .collect();
        Ok(out)
    }

    pub fn get_feed_health_summary(&self) -> Result<FeedHealthOverview> {
        let records = self.store.all()?;
        let total = self.config.feeds.len();
        let checked = records.len();

        let mut by_status: HashMap<String, usize> = HashMap::new();
        for r in &records {
            let key = match r.status {
                FeedStatus::Healthy => "healthy",
                FeedStatus::Degraded => "degraded",
                FeedStatus::Broken => "broken",
                FeedStatus::Unknown => "unknown",
            };
            *by_status.entry(key.to_string()).or_insert(0) += 1;
        }

        let avg_response_time_ms = if records.is_empty() {
            None
        } else {
            let sum: u64 = records.iter().map(|r| r.last_response_time_ms).sum();
            Some(sum as f64 / records.len() as f64)
        };
        let last_checked_at = records.iter().map(|r| r.last_checked_at).max();

        Ok(FeedHealthOverview {
            total,
            checked,
            never_checked: total.saturating_sub(checked),
            by_status,
            avg_response_time_ms,
            last_checked_at,
        })
    }

    /// Lightweight heuristic: common feed paths on the same host, plus
    /// already-configured feeds that look structurally similar. No
    /// guarantee any candidate actually resolves.
    pub fn suggest_replacements(&self, url: &str) -> Vec<ReplacementSuggestion> {
        let Ok(parsed) = Url::parse(url) else {
            return Vec::new();
        };
        let Some(host) = parsed.host_str().map(String::from) else {
            return Vec::new();
        };
        let scheme = parsed.scheme();
        let current_path = parsed.path();

        let mut out = Vec::new();
        for path in COMMON_FEED_PATHS {
            if *path == current_path {
                continue;
            }
            out.push(ReplacementSuggestion {
                label: host.clone(),
                url: format!("{scheme}://{host}{path}"),
                reason: "common feed path on the same host".to_string(),
            });
        }

        let broken_label = self
            .config
            .feeds
            .iter()
            .find(|f| f.url == url)
            .map(|f| f.label.to_lowercase());
        for feed in &self.config.feeds {
            if feed.url == url {
                continue;
            }
            let same_host = Url::parse(&feed.url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h == host))
                .unwrap_or(false);
            if same_host {
                out.push(ReplacementSuggestion {
                    label: feed.label.clone(),
                    url: feed.url.clone(),
                    reason: "already-configured feed on the same host".to_string(),
                });
                continue;
            }
            if let Some(broken_label) = &broken_label {
                let first_word = broken_label.split_whitespace().next().unwrap_or_default();
                if !first_word.is_empty()
                    && feed.label.to_lowercase().split_whitespace().next() == Some(first_word)
                {
                    out.push(ReplacementSuggestion {
                        label: feed.label.clone(),
                        url: feed.url.clone(),
                        reason: "configured feed with a similar label".to_string(),
                    });
                }
            }
        }
        out
    }
}
