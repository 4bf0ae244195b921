//! Remote classifier: provider abstraction + HTTP client + label mapping.
//!
//! The classifier answers with `[[{"label": ..., "score": ...}, ...]]`. Labels are
//! bucketed into positive/negative/neutral by substring and the summed scores are
//! rescaled to percentages. Any transport or payload problem is reported as a
//! `RemoteError` so the scorer can fall back to keywords.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::{detect_emotions, SentimentResult};
use crate::config::{ClassifierConfig, ClassifierMode};

/// One `(label, score)` pair as returned by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Ordered classifier output, consumed only by [`map_classification`].
pub type RawClassification = Vec<LabelScore>;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classifier returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("classifier response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected classifier payload: {0}")]
    Shape(&'static str),
    #[error("classifier unavailable: {0}")]
    Unavailable(&'static str),
}

/// Strategy seam used by the scorer. Implementations do exactly one attempt.
pub trait Classifier: Send + Sync {
    fn classify<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RawClassification, RemoteError>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn Classifier>;

/// Factory: build a classifier according to config.
///
/// * `mock` returns a deterministic static classifier.
/// * `offline` returns a classifier that is always unavailable.
/// * `remote` builds the HTTP classifier; if the HTTP client itself cannot be
///   built, every call falls back.
pub fn build_classifier(config: &ClassifierConfig) -> DynClassifier {
    match config.mode {
        ClassifierMode::Mock => Arc::new(StaticClassifier::star_rating_mock()),
        ClassifierMode::Offline => Arc::new(UnavailableClassifier::new("offline mode")),
        ClassifierMode::Remote => match HttpClassifier::new(config) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!(target: "sentiment", error = %e, "failed to build classifier client");
                Arc::new(UnavailableClassifier::new("client build failed"))
            }
        },
    }
}

// ------------------------------------------------------------
// HTTP classifier
// ------------------------------------------------------------

pub struct HttpClassifier {
    http: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mood-journal/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
        })
    }

    async fn classify_impl(&self, text: &str) -> Result<RawClassification, RemoteError> {
        #[derive(Serialize)]
        struct Req<'a> {
            inputs: &'a str,
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&Req { inputs: text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        parse_classification(&body)
    }
}

impl Classifier for HttpClassifier {
    fn classify<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RawClassification, RemoteError>> + Send + 'a>> {
        Box::pin(self.classify_impl(text))
    }
    fn name(&self) -> &'static str {
        "http"
    }
}

// ------------------------------------------------------------
// Offline / test classifiers
// ------------------------------------------------------------

/// Always answers with the same classification.
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    pub fixed: RawClassification,
}

impl StaticClassifier {
    pub fn new(fixed: RawClassification) -> Self {
        Self { fixed }
    }

    /// Star-rating distribution leaning positive, used for `mock` mode.
    pub fn star_rating_mock() -> Self {
        let pairs = [
            ("5 stars", 0.55),
            ("4 stars", 0.20),
            ("3 stars", 0.10),
            ("2 stars", 0.05),
            ("1 star", 0.10),
        ];
        Self::new(
            pairs
                .iter()
                .map(|(label, score)| LabelScore {
                    label: label.to_string(),
                    score: *score,
                })
                .collect(),
        )
    }
}

impl Classifier for StaticClassifier {
    fn classify<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RawClassification, RemoteError>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Ok(out) })
    }
    fn name(&self) -> &'static str {
        "static"
    }
}

/// Fails every call; forces the keyword fallback.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableClassifier {
    reason: &'static str,
}

impl UnavailableClassifier {
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

impl Classifier for UnavailableClassifier {
    fn classify<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<RawClassification, RemoteError>> + Send + 'a>> {
        let reason = self.reason;
        Box::pin(async move { Err(RemoteError::Unavailable(reason)) })
    }
    fn name(&self) -> &'static str {
        "unavailable"
    }
}

// ------------------------------------------------------------
// Payload parsing + mapping
// ------------------------------------------------------------

/// Extract the first classification list from a response body.
///
/// A body that is not an array, an empty array, or one whose first element is
/// an empty string or empty object carries no signal and yields an empty
/// classification. Any other first element that is not a list of objects with
/// a string `label` and numeric `score` is a shape error. Missing fields default
/// to `""` and `0`.
pub fn parse_classification(body: &Value) -> Result<RawClassification, RemoteError> {
    let Some(first) = body.as_array().and_then(|a| a.first()) else {
        return Ok(Vec::new());
    };
    let items = match first {
        Value::Array(items) => items,
        Value::String(s) if s.is_empty() => return Ok(Vec::new()),
        Value::Object(m) if m.is_empty() => return Ok(Vec::new()),
        _ => return Err(RemoteError::Shape("first element is not a list")),
    };

    items
        .iter()
        .map(|item| {
            let obj = item
                .as_object()
                .ok_or(RemoteError::Shape("classification item is not an object"))?;
            let label = match obj.get("label") {
                None => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(_) => return Err(RemoteError::Shape("label is not a string")),
            };
            let score = match obj.get("score") {
                None => 0.0,
                Some(v) => v
                    .as_f64()
                    .ok_or(RemoteError::Shape("score is not a number"))?,
            };
            Ok(LabelScore { label, score })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Positive,
    Neutral,
    Negative,
}

fn bucket_for(label: &str) -> Bucket {
    let l = label.to_lowercase();
    if l.contains("positive") || l.contains('5') || l.contains('4') {
        Bucket::Positive
    } else if l.contains("negative") || l.contains('1') || l.contains('2') {
        Bucket::Negative
    } else {
        Bucket::Neutral
    }
}

/// Map a classification to a polarity split and attach the keyword emotions of `text`.
///
/// With no signal (empty list or zero total score) all three buckets stay at 0.
pub fn map_classification(raw: &[LabelScore], text: &str) -> SentimentResult {
    let (mut positive, mut neutral, mut negative) = (0.0f64, 0.0f64, 0.0f64);
    for pair in raw {
        match bucket_for(&pair.label) {
            Bucket::Positive => positive += pair.score,
            Bucket::Neutral => neutral += pair.score,
            Bucket::Negative => negative += pair.score,
        }
    }

    let total = positive + neutral + negative;
    if total > 0.0 {
        positive = (positive / total) * 100.0;
        neutral = (neutral / total) * 100.0;
        negative = (negative / total) * 100.0;
    }

    SentimentResult {
        positive,
        neutral,
        negative,
        emotions: Some(detect_emotions(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn pair(label: &str, score: f64) -> LabelScore {
        LabelScore {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn star_labels_map_to_polarity() {
        let raw = parse_classification(&json!([[
            {"label": "5 stars", "score": 0.9},
            {"label": "1 star", "score": 0.1}
        ]]))
        .unwrap();
        let r = map_classification(&raw, "nothing special");
        assert!(approx(r.positive, 90.0));
        assert!(approx(r.negative, 10.0));
        assert!(approx(r.neutral, 0.0));
    }

    #[test]
    fn three_stars_and_unknown_labels_are_neutral() {
        let raw = vec![pair("3 stars", 0.5), pair("MIXED", 0.5)];
        let r = map_classification(&raw, "");
        assert!(approx(r.neutral, 100.0));
    }

    #[test]
    fn label_matching_is_case_insensitive_and_positive_wins() {
        assert_eq!(bucket_for("POSITIVE"), Bucket::Positive);
        assert_eq!(bucket_for("Negative"), Bucket::Negative);
        assert_eq!(bucket_for("LABEL_2"), Bucket::Negative);
        // Contains both "4" and "1": the positive check runs first.
        assert_eq!(bucket_for("label 41"), Bucket::Positive);
        assert_eq!(bucket_for("neutral"), Bucket::Neutral);
    }

    #[test]
    fn zero_signal_leaves_polarity_at_zero_but_keeps_emotions() {
        let r = map_classification(&[], "so happy");
        assert_eq!((r.positive, r.neutral, r.negative), (0.0, 0.0, 0.0));
        let emotions = r.emotions.expect("emotions attached");
        assert!(approx(emotions.joy, 100.0));

        let r = map_classification(&[pair("5 stars", 0.0)], "");
        assert_eq!((r.positive, r.neutral, r.negative), (0.0, 0.0, 0.0));
    }

    #[test]
    fn non_list_or_empty_body_is_zero_signal() {
        assert!(parse_classification(&json!({"error": "loading"})).unwrap().is_empty());
        assert!(parse_classification(&json!([])).unwrap().is_empty());
        assert!(parse_classification(&json!("text")).unwrap().is_empty());
        assert!(parse_classification(&json!([""])).unwrap().is_empty());
        assert!(parse_classification(&json!([{}])).unwrap().is_empty());
        assert!(parse_classification(&json!([[]])).unwrap().is_empty());
    }

    #[test]
    fn malformed_first_element_is_shape_error() {
        for body in [
            json!([{"label": "5 stars", "score": 1.0}]),
            json!([["5 stars"]]),
            json!(["5 stars"]),
            json!([null]),
            json!([[{"label": 5, "score": 1.0}]]),
            json!([[{"label": "5 stars", "score": "high"}]]),
            json!([[{"label": null, "score": 1.0}]]),
        ] {
            let err = parse_classification(&body).unwrap_err();
            assert!(matches!(err, RemoteError::Shape(_)), "body {body} gave {err:?}");
        }
    }

    #[test]
    fn missing_fields_default_to_empty_label_and_zero_score() {
        let raw = parse_classification(&json!([[{"score": 0.4}, {"label": "5 stars"}]])).unwrap();
        assert_eq!(raw, vec![pair("", 0.4), pair("5 stars", 0.0)]);
        let r = map_classification(&raw, "");
        assert!(approx(r.neutral, 100.0));
    }

    #[tokio::test]
    async fn unavailable_classifier_always_errors() {
        let c = UnavailableClassifier::new("test");
        let err = c.classify("anything").await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable("test")));
    }

    #[tokio::test]
    async fn mock_classifier_is_deterministic() {
        let c = StaticClassifier::star_rating_mock();
        let a = c.classify("a").await.unwrap();
        let b = c.classify("b").await.unwrap();
        assert_eq!(a, b);
        let r = map_classification(&a, "");
        assert!(approx(r.positive, 75.0));
        assert!(approx(r.neutral, 10.0));
        assert!(approx(r.negative, 15.0));
    }
}
