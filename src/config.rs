// src/config.rs
//! Process configuration: the static feed list plus pipeline tunables.
//! Loaded once at startup from TOML (env path override, then the default
//! path, then the built-in seed). Not editable at runtime.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::FeedSource;

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedSource>,
    /// Similarity floor for joining an existing cluster.
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold: f64,
    /// Diversity quota per leader publisher.
    #[serde(default = "default_max_per_publisher")]
    pub max_per_publisher: usize,
    /// Eligibility floor for a cluster to become a digest item.
    #[serde(default = "default_min_distinct_publishers")]
    pub min_distinct_publishers: usize,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
    #[serde(default = "default_health_latency_budget_ms")]
    pub health_latency_budget_ms: u64,
    /// When set, digests and health records persist as JSON files here;
    /// otherwise the in-memory store is used.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_cluster_threshold() -> f64 {
    crate::cluster::DEFAULT_CLUSTER_THRESHOLD
}
fn default_max_per_publisher() -> usize {
    crate::diversity::DEFAULT_MAX_PER_PUBLISHER
}
fn default_min_distinct_publishers() -> usize {
    1
}
fn default_fetch_concurrency() -> usize {
    4
}
fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_health_timeout_secs() -> u64 {
    10
}
fn default_health_latency_budget_ms() -> u64 {
    5_000
}
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_feeds() -> Vec<FeedSource> {
    let seed: &[(&str, &str, Option<&str>)] = &[
        ("OpenAI Blog", "https://openai.com/blog/rss.xml", Some("product")),
        (
            "MIT Technology Review",
            "https://www.technologyreview.com/feed/",
            Some("research"),
        ),
        (
            "Ars Technica",
            "https://feeds.arstechnica.com/arstechnica/technology-lab",
            None,
        ),
        ("The Verge", "https://www.theverge.com/rss/index.xml", None),
        ("TechCrunch", "https://techcrunch.com/feed/", None),
        ("VentureBeat", "https://venturebeat.com/feed/", Some("business")),
        ("Wired", "https://www.wired.com/feed/rss", None),
        ("NVIDIA Blog", "https://blogs.nvidia.com/feed/", Some("product")),
    ];
    seed.iter()
        .map(|(label, url, hint)| FeedSource {
            label: label.to_string(),
            url: url.to_string(),
            genre_hint: hint.map(String::from),
        })
        .collect()
}

impl AppConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $DIGEST_CONFIG_PATH (must exist when set)
    /// 2) config/digest.toml
    /// 3) built-in seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("DIGEST_CONFIG_PATH points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default_seed())
    }

    pub fn default_seed() -> Self {
        // serde defaults double as the seed.
        toml::from_str("").expect("empty config deserializes via defaults")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn seed_has_feeds_and_sane_tunables() {
        let cfg = AppConfig::default_seed();
        assert!(!cfg.feeds.is_empty());
        assert_eq!(cfg.cluster_threshold, 0.35);
        assert_eq!(cfg.max_per_publisher, 3);
        assert_eq!(cfg.fetch_concurrency, 4);
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            cluster_threshold = 0.5

            [[feeds]]
            label = "Example"
            url = "https://example.com/feed"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.feeds.len(), 1);
        assert_eq!(cfg.cluster_threshold, 0.5);
        assert_eq!(cfg.max_per_publisher, 3);
    }

    #[serial_test::serial]
    #[test]
    fn env_path_must_exist_when_set() {
        env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");
        assert!(AppConfig::load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);
    }
}
