// src/publisher.rs
//! Derives a publisher display name from an article URL: host lookup in a
//! label table, defaulting to the bare host when unmapped.

use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// Host -> display label table with a built-in seed.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherLabels {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl PublisherLabels {
    /// Publisher for an article URL. Lookup order: exact host, host with
    /// a leading `www.` stripped, then registrable-suffix match so
    /// `blogs.nvidia.com` resolves through a `nvidia.com` entry. Falls
    /// back to the bare host, or the whole URL string if it fails to parse.
    pub fn publisher_for(&self, url: &str) -> String {
        let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
            Some(h) => h,
            None => return url.to_string(),
        };
        let trimmed = host.strip_prefix("www.").unwrap_or(&host).to_string();

        if let Some(label) = self.labels.get(&host).or_else(|| self.labels.get(&trimmed)) {
            return label.clone();
        }
        for (key, label) in &self.labels {
            if trimmed.ends_with(&format!(".{key}")) {
                return label.clone();
            }
        }
        trimmed
    }

    pub fn default_seed() -> Self {
        let mut labels = HashMap::new();
        for (host, label) in [
            ("reuters.com", "Reuters"),
            ("bloomberg.com", "Bloomberg"),
            ("techcrunch.com", "TechCrunch"),
            ("theverge.com", "The Verge"),
            ("arstechnica.com", "Ars Technica"),
            ("wired.com", "Wired"),
            ("technologyreview.com", "MIT Technology Review"),
            ("venturebeat.com", "VentureBeat"),
            ("nvidia.com", "NVIDIA"),
            ("openai.com", "OpenAI"),
        ] {
            labels.insert(host.to_string(), label.to_string());
        }
        Self { labels }
    }
}
