// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod classify;
pub mod cluster;
pub mod config;
pub mod dates;
pub mod diversity;
pub mod fetch;
pub mod health;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod publisher;
pub mod relevance;
pub mod score;
pub mod similarity;
pub mod store;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::health::FeedHealthMonitor;
pub use crate::pipeline::Orchestrator;
pub use crate::store::AppStores;
