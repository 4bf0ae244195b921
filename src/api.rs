use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::{AppConfig, DEFAULT_HISTORY_LIMIT};
use crate::error::ApiError;
use crate::journal::{build_store, DynJournalStore, MoodEntry, MoodTrends, NewEntry};
use crate::sentiment::{SentimentResult, SentimentScorer};

/// Header carrying the caller identity, set by the auth proxy in front of us.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub scorer: SentimentScorer,
    pub store: DynJournalStore,
    pub history_limit: usize,
}

impl AppState {
    pub fn new(scorer: SentimentScorer, store: DynJournalStore) -> Self {
        Self {
            scorer,
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let scorer = SentimentScorer::from_config(&cfg.classifier);
        let store = build_store(&cfg.store)?;
        info!(
            classifier = scorer.classifier_name(),
            store = store.name(),
            history_limit = cfg.history_limit,
            "app state ready"
        );
        Ok(Self::new(scorer, store).with_history_limit(cfg.history_limit))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .route("/api/mood/analyze", post(analyze_mood))
        .route("/api/mood/entry", post(create_entry))
        .route("/api/mood/history", get(history))
        .route("/api/insights/trends", get(trends))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Caller identity taken from [`USER_ID_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::Unauthorized("missing user identity"))?;
        Ok(CurrentUser(id.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct MoodEntryReq {
    pub text: String,
    pub date: String,
    pub time: String,
}

#[derive(Serialize)]
struct AnalyzeResp {
    sentiment: SentimentResult,
}

#[derive(Serialize)]
struct EntryResp {
    id: i64,
    sentiment: SentimentResult,
}

#[derive(Serialize)]
struct HistoryResp {
    entries: Vec<MoodEntry>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum TrendsBody {
    Trends(MoodTrends),
    Empty { message: &'static str },
}

#[derive(Serialize)]
struct TrendsResp {
    trends: TrendsBody,
}

fn parse_body(payload: Result<Json<MoodEntryReq>, JsonRejection>) -> Result<MoodEntryReq, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::InvalidArgument(e.body_text()))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Mood Journal API is running" }))
}

async fn analyze_mood(
    State(state): State<AppState>,
    payload: Result<Json<MoodEntryReq>, JsonRejection>,
) -> Result<Json<AnalyzeResp>, ApiError> {
    let entry = parse_body(payload)?;
    let sentiment = state.scorer.analyze(&entry.text).await;
    Ok(Json(AnalyzeResp { sentiment }))
}

async fn create_entry(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<MoodEntryReq>, JsonRejection>,
) -> Result<Json<EntryResp>, ApiError> {
    let entry = parse_body(payload)?;
    let sentiment = state.scorer.analyze(&entry.text).await;

    let id = state
        .store
        .create_entry(NewEntry {
            user_id,
            text: entry.text,
            date: entry.date,
            time: entry.time,
            sentiment: sentiment.clone(),
        })
        .await?;
    counter!("journal_entries_created_total").increment(1);
    info!(target: "journal", id, store = state.store.name(), "entry created");

    Ok(Json(EntryResp { id, sentiment }))
}

async fn history(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<HistoryResp>, ApiError> {
    let entries = state.store.user_entries(&user_id, state.history_limit).await?;
    Ok(Json(HistoryResp { entries }))
}

async fn trends(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<TrendsResp>, ApiError> {
    let trends = match state.store.mood_trends(&user_id).await? {
        Some(t) => TrendsBody::Trends(t),
        None => TrendsBody::Empty {
            message: "No data available",
        },
    };
    Ok(Json(TrendsResp { trends }))
}

/// Convenience for tests and embedding: state over an in-memory store.
pub fn memory_state(scorer: SentimentScorer) -> AppState {
    AppState::new(scorer, Arc::new(crate::journal::MemoryStore::new()))
}
