//! Integration test: vendor-backed sources against a local axum server
//! standing in for Apify and Serper.

use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use apify_client::ApifyClient;
use mentionscope_engine::sources::{InstagramSource, TikTokSource, WebSource};
use mentionscope_engine::{
    Aggregator, AggregatorConfig, SearchRequest, SourceName, SourceRegistry, SourceStatus,
};

const TIKTOK_ACTOR: &str = "GdWCkxBtKWOsKjdch";

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn actor(Path(actor): Path<String>, Json(input): Json<Value>) -> Response {
    if actor != TIKTOK_ACTOR {
        return (StatusCode::INTERNAL_SERVER_ERROR, "actor crashed").into_response();
    }
    let term = input["searchQueries"][0].as_str().unwrap_or_default().to_string();
    Json(json!([
        {
            "id": "7001",
            "desc": format!("{term} update from the city"),
            "createTimeISO": "2024-05-30T10:00:00.000Z",
            "authorMeta": { "name": "cityhall" },
            "diggCount": 50,
            "commentCount": 2,
            "shareCount": 1,
            "playCount": 1200,
            "webVideoUrl": "https://www.tiktok.com/@cityhall/video/7001?_r=1"
        }
    ]))
    .into_response()
}

async fn serper(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("serper-key") {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    Json(json!({
        "searchParameters": body,
        "organic": [
            { "title": "Transit delay on Route 5", "link": "https://news.example.com/a?utm_source=feed", "snippet": "Buses running late after a signal delay", "date": "2024-05-31" }
        ]
    }))
    .into_response()
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

#[tokio::test]
async fn vendor_sources_flow_through_aggregation() {
    let app = Router::new()
        .route("/v2/acts/{actor}/run-sync-get-dataset-items", post(actor))
        .route("/search", post(serper));
    let base = spawn(app).await;

    let apify = ApifyClient::new("apify-token".into()).with_base_url(format!("{base}/v2"));
    let registry = SourceRegistry::new()
        .with(std::sync::Arc::new(TikTokSource::new(apify.clone())))
        .with(std::sync::Arc::new(InstagramSource::new(apify)))
        .with(std::sync::Arc::new(
            WebSource::new("serper-key", Duration::from_secs(5))
                .with_endpoint(format!("{base}/search")),
        ));
    let config = AggregatorConfig {
        fallback_seed: Some(1),
        ..AggregatorConfig::default()
    };
    let aggregator = Aggregator::new(registry, config).with_clock(fixed_clock);

    let request = SearchRequest::new(
        "transit",
        [SourceName::TikTok, SourceName::Instagram, SourceName::Web],
    );
    let result = aggregator.run(&request).await.unwrap();

    assert_eq!(result.per_source_status[&SourceName::TikTok], SourceStatus::Ok);
    assert_eq!(result.per_source_status[&SourceName::Web], SourceStatus::Ok);
    assert_eq!(result.per_source_status[&SourceName::Instagram], SourceStatus::Error);
    assert!(result.source_errors[&SourceName::Instagram].contains("500"));

    let tiktok = &result.records[0];
    assert_eq!(tiktok.id, "tiktok:7001");
    assert_eq!(tiktok.author, "cityhall");
    assert_eq!(tiktok.content, "transit update from the city");
    assert_eq!(tiktok.counts.views, 1200);
    assert_eq!(
        tiktok.url.as_deref(),
        Some("https://www.tiktok.com/@cityhall/video/7001")
    );
    assert!(!tiktok.timestamp_approximate);

    let web = result
        .records
        .iter()
        .find(|r| r.source == SourceName::Web)
        .unwrap();
    assert_eq!(web.content, "Buses running late after a signal delay");
    assert_eq!(web.url.as_deref(), Some("https://news.example.com/a"));
    assert_eq!(web.derived.severity, mentionscope_engine::Severity::Medium);
}

#[tokio::test]
async fn wrong_serper_key_is_a_source_error() {
    let app = Router::new().route("/search", post(serper));
    let base = spawn(app).await;

    let registry = SourceRegistry::new().with(std::sync::Arc::new(
        WebSource::new("wrong", Duration::from_secs(5)).with_endpoint(format!("{base}/search")),
    ));
    let aggregator = Aggregator::new(registry, AggregatorConfig::default()).with_clock(fixed_clock);

    let result = aggregator
        .run(&SearchRequest::new("transit", [SourceName::Web]))
        .await
        .unwrap();

    assert_eq!(result.per_source_status[&SourceName::Web], SourceStatus::Error);
    assert!(result.records.iter().all(|r| r.is_fallback()));
}
