// src/relevance.rs
//! Relevance gate applied before clustering: promotional markers reject an
//! entry outright, otherwise at least one topical keyword must be present.
//! Entries that fail are dropped hard and never appear downstream.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const ENV_RELEVANCE_CONFIG_PATH: &str = "RELEVANCE_CONFIG_PATH";
pub const DEFAULT_RELEVANCE_CONFIG_PATH: &str = "config/relevance.toml";

/// Static keyword lists. Not learned; loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceFilter {
    pub topical: Vec<String>,
    pub promotional: Vec<String>,
}

impl RelevanceFilter {
    /// Load from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading relevance config from {}", path.display()))?;
        let filter: RelevanceFilter = toml::from_str(&content)
            .with_context(|| format!("parsing relevance config {}", path.display()))?;
        Ok(filter.lowercased())
    }

    /// Load using env var + default path, falling back to the built-in seed.
    pub fn load_default() -> Self {
        if let Ok(p) = std::env::var(ENV_RELEVANCE_CONFIG_PATH) {
            if let Ok(f) = Self::load_from(Path::new(&p)) {
                return f;
            }
        }
        let default = Path::new(DEFAULT_RELEVANCE_CONFIG_PATH);
        if default.exists() {
            if let Ok(f) = Self::load_from(default) {
                return f;
            }
        }
        Self::default_seed()
    }

    /// Accept only entries that carry a topical keyword and no promotional
    /// marker. Promotional rejection wins over topical acceptance.
    pub fn is_relevant(&self, title: &str, excerpt: &str) -> bool {
        let combined = format!("{} {}", title, excerpt).to_lowercase();
        if self.promotional.iter().any(|k| combined.contains(k)) {
            return false;
        }
        self.topical.iter().any(|k| combined.contains(k))
    }

    fn lowercased(mut self) -> Self {
        for k in self.topical.iter_mut().chain(self.promotional.iter_mut()) {
            *k = k.to_lowercase();
        }
        self
    }

    /// Built-in seed for the digest's subject domain (AI/tech news).
    pub fn default_seed() -> Self {
        let topical = [
            "ai",
            "artificial intelligence",
            "machine learning",
            "model",
            "llm",
            "gpt",
            "agent",
            "robot",
            "chip",
            "semiconductor",
            "compute",
            "dataset",
            "neural",
            "openai",
            "anthropic",
            "deepmind",
            "nvidia",
            "research",
            "software",
            "startup",
            "algorithm",
            "automation",
        ];
        let promotional = [
            "sponsored",
            "discount",
            "subscribe",
            "affiliate",
            "promo code",
            "coupon",
            "giveaway",
            "% off",
            "limited time offer",
            "advertisement",
            "buy now",
        ];
        Self {
            topical: topical.iter().map(|s| s.to_string()).collect(),
            promotional: promotional.iter().map(|s| s.to_string()).collect(),
        }
    }
}
