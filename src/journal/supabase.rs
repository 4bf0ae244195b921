//! Supabase (PostgREST) journal store.
//!
//! Table `mood_entries(id, user_id, text, date, time, sentiment, created_at)`.
//! The `sentiment` column holds the result serialized as a JSON string; rows
//! whose column is native JSON are accepted too. `created_at` may come back
//! with or without an offset; offset-less values are read as UTC.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{JournalStore, MoodEntry, NewEntry};
use crate::sentiment::SentimentResult;

const TABLE: &str = "mood_entries";

#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    table_url: String,
    anon_key: String,
}

impl SupabaseStore {
    pub fn new(url: &str, anon_key: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building datastore http client")?;
        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{TABLE}", url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        })
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

#[derive(Serialize)]
struct InsertRow<'a> {
    user_id: &'a str,
    text: &'a str,
    date: &'a str,
    time: &'a str,
    sentiment: String,
    created_at: String,
}

#[derive(Deserialize)]
struct Row {
    id: i64,
    user_id: String,
    text: String,
    date: String,
    time: String,
    sentiment: Value,
    #[serde(deserialize_with = "lenient_timestamp")]
    created_at: DateTime<Utc>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid created_at timestamp: {raw}")))
}

#[derive(Deserialize)]
struct IdRow {
    id: i64,
}

impl TryFrom<Row> for MoodEntry {
    type Error = anyhow::Error;

    fn try_from(row: Row) -> Result<Self> {
        let sentiment: SentimentResult = match row.sentiment {
            Value::String(s) => serde_json::from_str(&s),
            other => serde_json::from_value(other),
        }
        .with_context(|| format!("decoding sentiment of entry {}", row.id))?;
        Ok(MoodEntry {
            id: row.id,
            user_id: row.user_id,
            text: row.text,
            date: row.date,
            time: row.time,
            sentiment,
            created_at: row.created_at,
        })
    }
}

#[async_trait::async_trait]
impl JournalStore for SupabaseStore {
    async fn create_entry(&self, entry: NewEntry) -> Result<i64> {
        let row = InsertRow {
            user_id: &entry.user_id,
            text: &entry.text,
            date: &entry.date,
            time: &entry.time,
            sentiment: serde_json::to_string(&entry.sentiment)?,
            created_at: Utc::now().to_rfc3339(),
        };

        let resp = self
            .authed(self.client.post(&self.table_url))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .context("datastore insert request failed")?
            .error_for_status()
            .context("datastore insert rejected")?;

        let inserted: Vec<IdRow> = resp.json().await.context("decoding insert response")?;
        let id = inserted
            .first()
            .map(|r| r.id)
            .ok_or_else(|| anyhow!("datastore insert returned no rows"))?;
        debug!(target: "journal", id, "entry stored");
        Ok(id)
    }

    async fn user_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>> {
        let user_filter = format!("eq.{user_id}");
        let limit = limit.to_string();
        let rows: Vec<Row> = self
            .authed(self.client.get(&self.table_url))
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .context("datastore query failed")?
            .error_for_status()
            .context("datastore query rejected")?
            .json()
            .await
            .context("decoding datastore rows")?;

        rows.into_iter().map(MoodEntry::try_from).collect()
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(sentiment: Value) -> Row {
        Row {
            id: 9,
            user_id: "u".into(),
            text: "t".into(),
            date: "d".into(),
            time: "h".into(),
            sentiment,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sentiment_column_accepts_string_or_json() {
        let as_string = row(json!(r#"{"positive":1.0,"neutral":99.0,"negative":0.0}"#));
        let e = MoodEntry::try_from(as_string).unwrap();
        assert_eq!(e.sentiment.neutral, 99.0);
        assert!(e.sentiment.emotions.is_none());

        let as_json = row(json!({"positive": 50.0, "neutral": 0.0, "negative": 50.0,
            "emotions": {"joy": 100.0, "sadness": 0.0, "anger": 0.0, "fear": 0.0, "surprise": 0.0}}));
        let e = MoodEntry::try_from(as_json).unwrap();
        assert_eq!(e.sentiment.emotions.unwrap().joy, 100.0);
    }

    #[test]
    fn corrupt_sentiment_is_an_error() {
        assert!(MoodEntry::try_from(row(json!("not json"))).is_err());
    }

    #[test]
    fn timestamps_with_or_without_offset_parse() {
        let expected = "2024-05-01T08:00:00.123456Z"
            .parse::<DateTime<Utc>>()
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-01T08:00:00.123456"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 08:00:00.123456"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T08:00:00.123456+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00.123456+02:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn row_decodes_offsetless_created_at() {
        let row: Row = serde_json::from_value(json!({
            "id": 3, "user_id": "u", "text": "t", "date": "d", "time": "h",
            "sentiment": "{\"positive\":0.0,\"neutral\":100.0,\"negative\":0.0}",
            "created_at": "2024-05-01T08:00:00"
        }))
        .unwrap();
        assert_eq!(row.created_at.to_rfc3339(), "2024-05-01T08:00:00+00:00");
    }

    #[test]
    fn table_url_ignores_trailing_slash() {
        let s = SupabaseStore::new("https://x.supabase.co/", "k").unwrap();
        assert_eq!(s.table_url, "https://x.supabase.co/rest/v1/mood_entries");
    }
}
