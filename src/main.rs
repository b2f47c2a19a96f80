//! Binary entrypoint: boots the Axum admin/trigger server, wiring config,
//! stores, the pipeline orchestrator, and the feed health monitor.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_digest_engine::api::{self, AppState};
use news_digest_engine::config::AppConfig;
use news_digest_engine::fetch::{FeedFetcher, HttpFeedFetcher};
use news_digest_engine::health::FeedHealthMonitor;
use news_digest_engine::metrics::Metrics;
use news_digest_engine::pipeline::Orchestrator;
use news_digest_engine::store::AppStores;
use news_digest_engine::summarize::TruncationSummarizer;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_digest_engine=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Arc::new(AppConfig::load_default().context("loading configuration")?);
    let stores = AppStores::from_data_dir(config.data_dir.as_deref())
        .context("opening digest/health stores")?;

    let fetcher: Arc<dyn FeedFetcher> = Arc::new(HttpFeedFetcher::new(Duration::from_secs(
        config.fetch_timeout_secs,
    )));

    let orchestrator = Arc::new(Orchestrator::new(
        config.clone(),
        fetcher.clone(),
        stores.digests.clone(),
        Arc::new(TruncationSummarizer::default()),
    ));
    let monitor = Arc::new(FeedHealthMonitor::new(
        config.clone(),
        fetcher,
        stores.health.clone(),
    ));

    let metrics = Metrics::init();
    let app = api::create_router(AppState {
        orchestrator,
        monitor,
        digests: stores.digests.clone(),
    })
    .merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, feeds = config.feeds.len(), "news digest engine listening");
    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
