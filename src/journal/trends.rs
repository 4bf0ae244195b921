//! Mood trend aggregation: one pass, three buckets.
//!
//! An entry counts as positive when its positive share beats the negative one,
//! negative for the reverse, and neutral on a tie (the neutral share itself is
//! not consulted).
//!
//! `daily`, `weekly` and `monthly` are part of the payload but are always empty
//! for now.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::MoodEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCounts {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl MoodCounts {
    pub fn total(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodTrends {
    pub daily: Vec<Value>,
    pub weekly: Vec<Value>,
    pub monthly: Vec<Value>,
    pub overall: MoodCounts,
}

pub fn compute(entries: &[MoodEntry]) -> Option<MoodTrends> {
    if entries.is_empty() {
        return None;
    }
    let mut overall = MoodCounts::default();
    for e in entries {
        let s = &e.sentiment;
        if s.positive > s.negative {
            overall.positive += 1;
        } else if s.negative > s.positive {
            overall.negative += 1;
        } else {
            overall.neutral += 1;
        }
    }
    Some(MoodTrends {
        overall,
        ..MoodTrends::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentResult;
    use chrono::Utc;

    fn entry(positive: f64, neutral: f64, negative: f64) -> MoodEntry {
        MoodEntry {
            id: 1,
            user_id: "u".into(),
            text: String::new(),
            date: String::new(),
            time: String::new(),
            sentiment: SentimentResult {
                positive,
                neutral,
                negative,
                emotions: None,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_entries_means_no_trends() {
        assert_eq!(compute(&[]), None);
    }

    #[test]
    fn buckets_by_positive_versus_negative() {
        let t = compute(&[
            entry(60.0, 30.0, 10.0),
            entry(10.0, 30.0, 60.0),
            entry(0.0, 100.0, 0.0),
            entry(33.3, 33.3, 33.3),
            // Neutral share is ignored: positive still beats negative.
            entry(5.0, 90.0, 4.0),
        ])
        .unwrap();
        assert_eq!(
            t.overall,
            MoodCounts {
                positive: 2,
                neutral: 2,
                negative: 1
            }
        );
        assert_eq!(t.overall.total(), 5);
        assert!(t.daily.is_empty() && t.weekly.is_empty() && t.monthly.is_empty());
    }
}
