// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod journal;
pub mod logging;
pub mod metrics;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::sentiment::{SentimentResult, SentimentScorer};

use axum::Router;
use tracing::info;

use crate::config::AppConfig;

/// Build the full application router from `cfg`.
///
/// Mounts `/metrics` when `cfg.metrics_enabled` is set.
pub fn app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg)?;
    let mut router = api::router(state);
    if cfg.metrics_enabled {
        let m = metrics::Metrics::init()?;
        router = router.merge(m.router());
        info!("metrics exposed at /metrics");
    }
    Ok(router)
}
