// src/api.rs
//! Admin/trigger HTTP surface: rebuild trigger, digest read side, and the
//! feed health interfaces. A fatal persistence error surfaces as HTTP 500;
//! a rebuild that persists zero items is a success with `count: 0`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::dates::today_date_iso;
use crate::health::{
    BrokenFeedInfo, FeedHealthMonitor, FeedHealthOverview, HealthSummary, ReplacementSuggestion,
};
use crate::model::DigestItem;
use crate::pipeline::Orchestrator;
use crate::store::DigestStore;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub monitor: Arc<FeedHealthMonitor>,
    pub digests: Arc<dyn DigestStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/digest", get(get_digest))
        .route("/admin/rebuild", post(admin_rebuild))
        .route("/admin/feeds/validate", post(admin_validate_feeds))
        .route("/admin/feeds/health", get(admin_feed_health))
        .route("/admin/feeds/broken", get(admin_broken_feeds))
        .route("/admin/feeds/suggest", get(admin_suggest))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn internal(e: anyhow::Error) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
}

#[derive(serde::Deserialize)]
struct RebuildParams {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(serde::Serialize)]
struct RebuildResp {
    date_iso: String,
    count: usize,
}

async fn admin_rebuild(
    State(state): State<AppState>,
    Query(params): Query<RebuildParams>,
) -> Result<Json<RebuildResp>, ApiError> {
    let limit = params.limit.unwrap_or(10);
    let count = state.orchestrator.rebuild(limit).await.map_err(internal)?;
    Ok(Json(RebuildResp {
        date_iso: today_date_iso(),
        count,
    }))
}

#[derive(serde::Deserialize)]
struct DigestParams {
    #[serde(default)]
    date: Option<String>,
}

async fn get_digest(
    State(state): State<AppState>,
    Query(params): Query<DigestParams>,
) -> Result<Json<Vec<DigestItem>>, ApiError> {
    let date = params.date.unwrap_or_else(today_date_iso);
    let items = state.digests.items_for_date(&date).map_err(internal)?;
    Ok(Json(items))
}

async fn admin_validate_feeds(
    State(state): State<AppState>,
) -> Result<Json<HealthSummary>, ApiError> {
    let summary = state.monitor.validate_all_feeds().await.map_err(internal)?;
    Ok(Json(summary))
}

async fn admin_feed_health(
    State(state): State<AppState>,
) -> Result<Json<FeedHealthOverview>, ApiError> {
    let overview = state.monitor.get_feed_health_summary().map_err(internal)?;
    Ok(Json(overview))
}

async fn admin_broken_feeds(
    State(state): State<AppState>,
) -> Result<Json<Vec<BrokenFeedInfo>>, ApiError> {
    let broken = state.monitor.get_broken_feeds().map_err(internal)?;
    Ok(Json(broken))
}

#[derive(serde::Deserialize)]
struct SuggestParams {
    url: String,
}

async fn admin_suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<Vec<ReplacementSuggestion>> {
    Json(state.monitor.suggest_replacements(&params.url))
}
