// src/pipeline.rs
//! # Pipeline Orchestrator
//!
//! One `rebuild` run: fetch all configured feeds with bounded concurrency,
//! map raw entries, relevance-filter, cluster, classify and score each
//! eligible cluster, diversity-limit, and atomically replace the persisted
//! digest for the current civil date.
//!
//! Feed fetch failures are per-feed and non-fatal; a persistence failure
//! is fatal to the run and propagates to the caller.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::classify::{classify_genre, classify_mood};
use crate::cluster::{cluster, Cluster};
use crate::config::AppConfig;
use crate::dates::today_date_iso;
use crate::diversity::limit_by_publisher;
use crate::fetch::FeedFetcher;
use crate::model::{DigestItem, MappedEntry, SourceRef};
use crate::publisher::PublisherLabels;
use crate::relevance::RelevanceFilter;
use crate::score::ReputationTable;
use crate::store::DigestStore;
use crate::summarize::Summarizer;

pub const MIN_DIGEST_LIMIT: usize = 5;
pub const MAX_DIGEST_LIMIT: usize = 30;
pub const MAX_SOURCES_PER_ITEM: usize = 5;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("digest_feeds_fetched_total", "Feeds fetched successfully.");
        describe_counter!("digest_fetch_errors_total", "Feed fetches that failed or timed out.");
        describe_counter!(
            "digest_entries_mapped_total",
            "Entries surviving mapping + relevance filtering."
        );
        describe_counter!("digest_clusters_total", "Clusters formed per rebuild.");
        describe_counter!("digest_items_persisted_total", "Digest items written.");
        describe_histogram!("digest_feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("digest_rebuild_last_run_ts", "Unix ts of the last rebuild.");
    });
}

pub struct Orchestrator {
    config: Arc<AppConfig>,
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<dyn DigestStore>,
    summarizer: Arc<dyn Summarizer>,
    relevance: RelevanceFilter,
    reputation: ReputationTable,
    labels: PublisherLabels,
}

impl Orchestrator {
    pub fn new(
        config: Arc<AppConfig>,
        fetcher: Arc<dyn FeedFetcher>,
        store: Arc<dyn DigestStore>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            summarizer,
            relevance: RelevanceFilter::load_default(),
            reputation: ReputationTable::load_from_file("config/reputation.json"),
            labels: PublisherLabels::default_seed(),
        }
    }

    /// Rebuild the digest for today's civil date. Returns the number of
    /// items persisted; `limit` is clamped to `[5, 30]`.
    pub async fn rebuild(&self, limit: usize) -> Result<usize> {
        ensure_metrics_described();
        let t0 = std::time::Instant::now();
        let fetched_at = Utc::now();

        let per_feed = self.fetch_all().await;

        let mut mapped = self.map_and_filter(per_feed, fetched_at);
        counter!("digest_entries_mapped_total").increment(mapped.len() as u64);

        // Canonical order (configured feed order, then item order) keeps
        // runs reproducible even when fetch completion reorders feeds.
        mapped.sort_by_key(|(feed_idx, item_idx, _)| (*feed_idx, *item_idx));
        let entries: Vec<MappedEntry> = mapped.into_iter().map(|(_, _, e)| e).collect();

        let clusters = cluster(entries, self.config.cluster_threshold);
        counter!("digest_clusters_total").increment(clusters.len() as u64);

        let eligible: Vec<Cluster> = clusters
            .into_iter()
            .filter(|c| c.distinct_publishers().len() >= self.config.min_distinct_publishers)
            .collect();

        // Diversity limiting runs over clustering order; the limiter never
        // sorts on its own.
        let limited = limit_by_publisher(eligible, self.config.max_per_publisher);

        let take = limit.clamp(MIN_DIGEST_LIMIT, MAX_DIGEST_LIMIT);
        let date_iso = today_date_iso();
        let items: Vec<DigestItem> = limited
            .into_iter()
            .take(take)
            .map(|c| self.digest_item(&date_iso, &c))
            .collect();

        // Fatal on failure: the caller owns surfacing and retry.
        let count = self
            .store
            .replace_for_date(&date_iso, items)
            .with_context(|| format!("persisting digest for {date_iso}"))?;

        counter!("digest_items_persisted_total").increment(count as u64);
        gauge!("digest_rebuild_last_run_ts").set(fetched_at.timestamp() as f64);
        info!(
            date = %date_iso,
            count,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "digest rebuild complete"
        );
        Ok(count)
    }

    /// Fan out over all configured feeds, at most `fetch_concurrency` in
    /// flight, each with its own timeout. Failures contribute nothing.
    async fn fetch_all(&self) -> Vec<(usize, Vec<crate::model::RawFeedItem>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.fetch_concurrency.max(1)));
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);

        let mut join_set = JoinSet::new();
        for (feed_idx, source) in self.config.feeds.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let result = tokio::time::timeout(timeout, fetcher.fetch(&source)).await;
                (feed_idx, source, result)
            });
        }

        let mut per_feed = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let Ok((feed_idx, source, result)) = joined else {
                continue;
            };
            match result {
                Ok(Ok(items)) => {
                    counter!("digest_feeds_fetched_total").increment(1);
                    per_feed.push((feed_idx, items));
                }
                Ok(Err(e)) => {
                    warn!(error = ?e, feed = %source.label, "feed fetch failed");
                    counter!("digest_fetch_errors_total").increment(1);
                }
                Err(_) => {
                    warn!(
                        feed = %source.label,
                        timeout_secs = self.config.fetch_timeout_secs,
                        "feed fetch timed out"
                    );
                    counter!("digest_fetch_errors_total").increment(1);
                }
            }
        }
        per_feed
    }

    fn map_and_filter(
        &self,
        per_feed: Vec<(usize, Vec<crate::model::RawFeedItem>)>,
        fetched_at: DateTime<Utc>,
    ) -> Vec<(usize, usize, MappedEntry)> {
        let mut mapped = Vec::new();
        for (feed_idx, items) in per_feed {
            for (item_idx, item) in items.into_iter().enumerate() {
                let excerpt = item.excerpt.unwrap_or_default();
                if !self.relevance.is_relevant(&item.title, &excerpt) {
                    continue;
                }
                let publisher = self.labels.publisher_for(&item.link);
                mapped.push((
                    feed_idx,
                    item_idx,
                    MappedEntry {
                        title: item.title,
                        url: item.link,
                        publisher,
                        published_at: item.published_at.unwrap_or(fetched_at),
                        excerpt,
                    },
                ));
            }
        }
        mapped
    }

    fn digest_item(&self, date_iso: &str, cluster: &Cluster) -> DigestItem {
        let leader = cluster.leader().clone();

        let mut sources = Vec::with_capacity(cluster.members.len().min(MAX_SOURCES_PER_ITEM));
        sources.push(source_ref(&leader));
        for m in &cluster.members {
            if sources.len() >= MAX_SOURCES_PER_ITEM {
                break;
            }
            if m.url == leader.url && m.title == leader.title {
                continue;
            }
            sources.push(source_ref(m));
        }

        let publishers = cluster.distinct_publishers();
        let summary = self
            .summarizer
            .summarize(&leader.title, &leader.excerpt, &publishers);

        DigestItem {
            id: digest_id(date_iso, &leader.title),
            date_iso: date_iso.to_string(),
            genre: classify_genre(&leader.title, &leader.excerpt),
            mood: classify_mood(&leader.title, &leader.excerpt),
            title: leader.title.clone(),
            summary: summary.summary,
            bullets: summary.bullets,
            sources,
            score: self.reputation.score(&publishers, &leader.title),
            updated_at: Utc::now(),
        }
    }
}

fn source_ref(entry: &MappedEntry) -> SourceRef {
    SourceRef {
        title: entry.title.clone(),
        url: entry.url.clone(),
        publisher: entry.publisher.clone(),
        published_at: entry.published_at,
    }
}

/// Stable short id from the partition date and leader title.
pub fn digest_id(date_iso: &str, title: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(date_iso.as_bytes());
    hasher.update(b":");
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
