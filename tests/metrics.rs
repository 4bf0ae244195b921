// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use mood_journal::config::{AppConfig, ClassifierConfig, ClassifierMode, StoreConfig};

// Full in-process app with /metrics mounted and the classifier offline,
// so every request goes through the fallback path.
fn build_app() -> Router {
    let cfg = AppConfig {
        classifier: ClassifierConfig {
            mode: ClassifierMode::Offline,
            ..ClassifierConfig::default()
        },
        store: StoreConfig::Memory,
        metrics_enabled: true,
        ..AppConfig::default()
    };
    mood_journal::app(&cfg).expect("app() should build Router in tests")
}

#[tokio::test]
async fn scoring_counters_show_up_after_requests() {
    let app = build_app();

    let r = app
        .clone()
        .oneshot(
            Request::post("/api/mood/entry")
                .header("content-type", "application/json")
                .header("x-user-id", "metrics-user")
                .body(Body::from(
                    r#"{"text":"calm and grateful","date":"2024-01-01","time":"09:00"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    let m = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(m.status(), StatusCode::OK);
    let body = body::to_bytes(m.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "sentiment_requests_total",
        "sentiment_fallback_total",
        "journal_entries_created_total",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}

#[tokio::test]
async fn building_twice_reuses_the_recorder() {
    // The Prometheus recorder is process-global; a second app must not fail.
    let _a = build_app();
    let _b = build_app();
}
