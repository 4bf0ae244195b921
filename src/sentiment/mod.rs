// src/sentiment/mod.rs
//! Sentiment scoring entry: remote classifier first, keyword fallback on any failure.
//!
//! Both paths return the same [`SentimentResult`] shape and attach the same
//! keyword emotion profile, so callers never see which strategy ran.

pub mod emotions;
pub mod local;
pub mod remote;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClassifierConfig;

// Re-export convenient types.
pub use crate::sentiment::emotions::{detect_emotions, Emotion, EmotionProfile};
pub use crate::sentiment::remote::{
    build_classifier, map_classification, Classifier, DynClassifier, LabelScore,
    RawClassification, RemoteError,
};

/// Polarity split (percent) plus the keyword emotion profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    /// `None` only for empty text on the fallback path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotions: Option<EmotionProfile>,
}

impl SentimentResult {
    pub fn polarity_sum(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }

    /// No classifier evidence at all: every polarity bucket is zero.
    pub fn is_degenerate(&self) -> bool {
        self.positive == 0.0 && self.neutral == 0.0 && self.negative == 0.0
    }
}

/// Scores journal text. Cheap to clone; holds only the classifier handle.
#[derive(Clone)]
pub struct SentimentScorer {
    classifier: DynClassifier,
}

impl SentimentScorer {
    pub fn new(classifier: DynClassifier) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(build_classifier(config))
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Score `text`. Never fails: remote errors are logged and replaced by the
    /// keyword fallback for the same text.
    pub async fn analyze(&self, text: &str) -> SentimentResult {
        counter!("sentiment_requests_total").increment(1);
        let id = text_id(text);

        match self.classifier.classify(text).await {
            Ok(raw) => {
                counter!("sentiment_remote_ok_total").increment(1);
                debug!(
                    target: "sentiment",
                    %id,
                    classifier = self.classifier.name(),
                    labels = raw.len(),
                    "remote classification ok"
                );
                map_classification(&raw, text)
            }
            Err(e) => {
                counter!("sentiment_fallback_total").increment(1);
                warn!(
                    target: "sentiment",
                    %id,
                    classifier = self.classifier.name(),
                    error = %e,
                    "remote classifier unavailable, using keyword fallback"
                );
                local::analyze(text)
            }
        }
    }
}

/// Lowercased whitespace tokens, shared by polarity and emotion matching.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Short anonymized id for log lines. Raw journal text is never logged.
pub(crate) fn text_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
