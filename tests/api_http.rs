// tests/api_http.rs
// Router-level tests via tower::ServiceExt::oneshot.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use http::{Request, StatusCode};
use tower::ServiceExt;

use news_digest_engine::api::{create_router, AppState};
use news_digest_engine::config::AppConfig;
use news_digest_engine::fetch::FeedFetcher;
use news_digest_engine::health::FeedHealthMonitor;
use news_digest_engine::model::{DigestItem, FeedSource, RawFeedItem};
use news_digest_engine::pipeline::Orchestrator;
use news_digest_engine::store::{DigestStore, MemoryStore};
use news_digest_engine::summarize::TruncationSummarizer;

struct StubFetcher {
    by_label: HashMap<String, Vec<RawFeedItem>>,
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawFeedItem>> {
        self.by_label
            .get(&source.label)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", source.url))
    }
}

struct FailingStore;

impl DigestStore for FailingStore {
    fn replace_for_date(&self, _date_iso: &str, _items: Vec<DigestItem>) -> Result<usize> {
        Err(anyhow!("disk full"))
    }

    fn items_for_date(&self, _date_iso: &str) -> Result<Vec<DigestItem>> {
        Ok(Vec::new())
    }
}

fn state_with(store: Arc<dyn DigestStore>) -> AppState {
    let mut cfg = AppConfig::default_seed();
    cfg.feeds = vec![FeedSource {
        label: "Wire".to_string(),
        url: "https://wire.example/rss".to_string(),
        genre_hint: None,
    }];
    let cfg = Arc::new(cfg);

    let items = vec![
        RawFeedItem {
            title: "OpenAI announces new model".to_string(),
            link: "https://openai.com/blog/a".to_string(),
            published_at: None,
            excerpt: None,
        },
        RawFeedItem {
            title: "Regulators review AI merger deal".to_string(),
            link: "https://www.reuters.com/tech/b".to_string(),
            published_at: None,
            excerpt: None,
        },
    ];
    let fetcher: Arc<dyn FeedFetcher> = Arc::new(StubFetcher {
        by_label: HashMap::from([("Wire".to_string(), items)]),
    });

    let orchestrator = Arc::new(Orchestrator::new(
        cfg.clone(),
        fetcher.clone(),
        store.clone(),
        Arc::new(TruncationSummarizer::default()),
    ));
    let monitor = Arc::new(FeedHealthMonitor::new(cfg, fetcher, Arc::new(MemoryStore::new())));
    AppState {
        orchestrator,
        monitor,
        digests: store,
    }
}

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_responds_ok() {
    let app = create_router(state_with(Arc::new(MemoryStore::new())));
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn rebuild_trigger_returns_count_and_populates_digest() {
    let store = Arc::new(MemoryStore::new());
    let app = create_router(state_with(store));

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/rebuild?limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["count"], 2);

    let resp = app
        .oneshot(Request::builder().uri("/digest").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let items = body_json(resp.into_body()).await;
    assert_eq!(items.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn persistence_failure_surfaces_as_500() {
    let app = create_router(state_with(Arc::new(FailingStore)));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/rebuild")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn feed_validation_and_suggestions_respond() {
    let app = create_router(state_with(Arc::new(MemoryStore::new())));

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/feeds/validate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["healthy"], 1);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/feeds/broken")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/admin/feeds/suggest?url=https://wire.example/rss")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert!(!json.as_array().unwrap().is_empty());
}
