//! Keyword fallback scorer, used whenever the remote classifier is unavailable.
//!
//! Polarity uses exact token matches only ("joyful" is not "joy"), unlike the
//! substring matching of the emotion detector.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::{detect_emotions, tokenize, SentimentResult};

const POSITIVE_WORDS: &[&str] = &[
    "happy", "joy", "love", "excited", "amazing", "wonderful", "great", "fantastic", "awesome",
    "good", "better", "best", "smile", "laugh", "grateful", "thankful", "blessed", "peaceful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "angry", "hate", "terrible", "awful", "bad", "worse", "worst", "cry", "upset",
    "frustrated", "anxious", "depressed", "lonely", "worried", "stressed",
];

static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| POSITIVE_WORDS.iter().copied().collect());
static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| NEGATIVE_WORDS.iter().copied().collect());

/// Share given to each bucket when the text has no tokens at all.
pub const EMPTY_TEXT_SHARE: f64 = 33.3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolarityCounts {
    pub positive: usize,
    pub negative: usize,
    pub total: usize,
}

pub fn count_polarity(text: &str) -> PolarityCounts {
    let mut counts = PolarityCounts::default();
    for token in tokenize(text) {
        counts.total += 1;
        if POSITIVE.contains(token.as_str()) {
            counts.positive += 1;
        } else if NEGATIVE.contains(token.as_str()) {
            counts.negative += 1;
        }
    }
    counts
}

/// Score `text` from the keyword lists alone.
///
/// Empty or whitespace-only text returns the fixed 33.3/33.3/33.3 split with no
/// emotion profile. Otherwise neutral is `100 - positive - negative` and each of
/// the three is clamped to [0, 100] after that subtraction.
pub fn analyze(text: &str) -> SentimentResult {
    let counts = count_polarity(text);
    if counts.total == 0 {
        return SentimentResult {
            positive: EMPTY_TEXT_SHARE,
            neutral: EMPTY_TEXT_SHARE,
            negative: EMPTY_TEXT_SHARE,
            emotions: None,
        };
    }

    let total = counts.total as f64;
    let positive = (counts.positive as f64 / total) * 100.0;
    let negative = (counts.negative as f64 / total) * 100.0;
    let neutral = 100.0 - positive - negative;

    SentimentResult {
        positive: clamp_pct(positive),
        neutral: clamp_pct(neutral),
        negative: clamp_pct(negative),
        emotions: Some(detect_emotions(text)),
    }
}

fn clamp_pct(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}
