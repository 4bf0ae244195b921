//! Mood Journal Service — Binary Entrypoint
//! Boots the Axum HTTP server with config loaded from the environment.

use mood_journal::config::AppConfig;
use mood_journal::logging::init_tracing;
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::from_env();
    tracing::info!(classifier = ?cfg.classifier, store = ?cfg.store, "config loaded");

    let router = mood_journal::app(&cfg)?;
    Ok(router.into())
}
