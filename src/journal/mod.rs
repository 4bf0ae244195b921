// src/journal/mod.rs
//! Journal persistence: entry types, the store trait, and store construction.

pub mod memory;
pub mod supabase;
pub mod trends;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::sentiment::SentimentResult;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;
pub use trends::{MoodCounts, MoodTrends};

/// Newest entries considered when aggregating trends.
pub const TRENDS_WINDOW: usize = 100;

/// Entry as submitted by the API, before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub user_id: String,
    pub text: String,
    /// Caller-supplied, stored verbatim.
    pub date: String,
    /// Caller-supplied, stored verbatim.
    pub time: String,
    pub sentiment: SentimentResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: String,
    pub text: String,
    pub date: String,
    pub time: String,
    pub sentiment: SentimentResult,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait JournalStore: Send + Sync {
    /// Persist `entry` and return its id. `created_at` is set to now.
    async fn create_entry(&self, entry: NewEntry) -> Result<i64>;

    /// The user's entries, newest first, at most `limit`.
    async fn user_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>>;

    /// Trend buckets over the newest [`TRENDS_WINDOW`] entries; `None` without data.
    async fn mood_trends(&self, user_id: &str) -> Result<Option<MoodTrends>> {
        let entries = self.user_entries(user_id, TRENDS_WINDOW).await?;
        Ok(trends::compute(&entries))
    }

    fn name(&self) -> &'static str;
}

pub type DynJournalStore = Arc<dyn JournalStore>;

pub fn build_store(config: &StoreConfig) -> Result<DynJournalStore> {
    let store: DynJournalStore = match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Supabase { url, anon_key } => Arc::new(SupabaseStore::new(url, anon_key)?),
    };
    Ok(store)
}
