// src/fetch.rs
//! Feed acquisition seam: a small async trait the orchestrator and health
//! monitor both consume, with an HTTP/RSS implementation. Tests implement
//! the trait directly with canned items.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::model::{FeedSource, RawFeedItem};

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawFeedItem>>;
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

/// Parse an RSS document into raw items. Items missing a title or link are
/// dropped individually; the rest of the feed still parses.
pub fn parse_feed_xml(xml: &str) -> Result<Vec<RawFeedItem>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let (Some(title), Some(link)) = (it.title, it.link) else {
            continue;
        };
        let title = html_escape::decode_html_entities(title.trim()).to_string();
        if title.is_empty() {
            continue;
        }
        out.push(RawFeedItem {
            title,
            link: link.trim().to_string(),
            published_at: it.pub_date.as_deref().and_then(parse_rfc2822),
            excerpt: it
                .description
                .map(|d| html_escape::decode_html_entities(d.trim()).to_string())
                .filter(|d| !d.is_empty()),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("digest_feed_parse_ms").record(ms);
    Ok(out)
}

pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("news-digest-engine/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawFeedItem>> {
        let body = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("GET {}", source.url))?
            .text()
            .await
            .with_context(|| format!("reading body of {}", source.url))?;
        parse_feed_xml(&body).with_context(|| format!("parsing feed {}", source.label))
    }
}

// quick-xml rejects HTML-only entities, so scrub the common ones first.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
