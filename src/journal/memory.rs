//! memory.rs: process-local journal store for dev runs and tests.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::Utc;

use super::{JournalStore, MoodEntry, NewEntry};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<MoodEntry>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl JournalStore for MemoryStore {
    async fn create_entry(&self, entry: NewEntry) -> Result<i64> {
        let mut g = self
            .inner
            .lock()
            .map_err(|_| anyhow!("journal mutex poisoned"))?;
        g.last_id += 1;
        let id = g.last_id;
        g.rows.push(MoodEntry {
            id,
            user_id: entry.user_id,
            text: entry.text,
            date: entry.date,
            time: entry.time,
            sentiment: entry.sentiment,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn user_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>> {
        let g = self
            .inner
            .lock()
            .map_err(|_| anyhow!("journal mutex poisoned"))?;
        let mut out: Vec<MoodEntry> = g
            .rows
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Newest first; ids break ties between entries created in the same instant.
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out.truncate(limit);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
