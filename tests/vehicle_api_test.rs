// Integration tests for the HTTP surface: ingestion → actors → queries

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fleetmap::api::{create_app, AppServices};
use fleetmap::config::ActorConfig;
use fleetmap::directory::ActorDirectory;
use fleetmap::ingest::IngestionRouter;
use fleetmap::metrics::MetricsTracker;
use fleetmap::query::QueryService;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// ── Test app ──────────────────────────────────────────────────────────────────

fn create_test_app() -> Router {
    let directory = Arc::new(ActorDirectory::new(&ActorConfig::default()));
    let metrics = Arc::new(MetricsTracker::new());

    create_app(AppServices {
        router: Arc::new(IngestionRouter::new(directory.clone(), metrics.clone())),
        query: Arc::new(QueryService::new(directory, Duration::from_secs(1))),
        metrics,
        round_interval: Duration::from_millis(50),
    })
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

fn event(id: &str, latitude: Option<f64>, longitude: Option<f64>) -> Value {
    json!({
        "vehicleId": id,
        "position": { "latitude": latitude, "longitude": longitude }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Valid update is queryable; a later invalid update changes nothing
#[tokio::test]
async fn test_end_to_end_position_update_and_query() {
    let app = create_test_app();

    let (status, _) = post_json(&app, "/api/events", event("bus-7", Some(37.7), Some(-122.4))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = get(&app, "/vehicle?id=bus-7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "bus-7");
    assert_eq!(body["latitude"], 37.7);
    assert_eq!(body["longitude"], -122.4);
    let first_observed = body["observedAt"].clone();

    let (status, body) = post_json(&app, "/api/events", event("bus-7", None, Some(-122.5))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["outcome"], "discarded");

    let (status, body) = get(&app, "/vehicle?id=bus-7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latitude"], 37.7);
    assert_eq!(body["longitude"], -122.4);
    assert_eq!(body["observedAt"], first_observed);
}

/// Unknown vehicle → 404 with error body
#[tokio::test]
async fn test_unknown_vehicle_returns_404() {
    let app = create_test_app();

    let (status, body) = get(&app, "/vehicle?id=ghost").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

/// Missing id → 400
#[tokio::test]
async fn test_missing_id_returns_400() {
    let app = create_test_app();

    let (status, body) = get(&app, "/vehicle").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

/// Invalid event for an unseen vehicle does not register it
#[tokio::test]
async fn test_invalid_event_does_not_create_vehicle() {
    let app = create_test_app();

    post_json(&app, "/api/events", event("tram-1204", Some(1.0), None)).await;

    let (status, _) = get(&app, "/vehicle?id=tram-1204").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/api/status").await;
    assert_eq!(body["vehicles"], 0);
    assert_eq!(body["metrics"]["events_discarded"], 1);
}

/// History keeps arrival order
#[tokio::test]
async fn test_history_endpoint() {
    let app = create_test_app();

    let (status, body) = post_json(
        &app,
        "/api/events/batch",
        json!({
            "events": [
                event("bus-7", Some(1.0), Some(1.0)),
                event("bus-7", Some(2.0), Some(2.0)),
                event("bus-7", Some(3.0), None),
                event("bus-7", Some(4.0), Some(4.0)),
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], 3);
    assert_eq!(body["discarded"], 1);

    let (status, body) = get(&app, "/vehicle/history?id=bus-7").await;
    assert_eq!(status, StatusCode::OK);
    let latitudes: Vec<f64> = body["positions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["latitude"].as_f64().unwrap())
        .collect();
    assert_eq!(latitudes, vec![1.0, 2.0, 4.0]);
}

/// Fleet listing contains every positioned vehicle
#[tokio::test]
async fn test_fleet_listing() {
    let app = create_test_app();

    post_json(&app, "/api/events", event("bus-2", Some(2.0), Some(2.0))).await;
    post_json(&app, "/api/events", event("bus-1", Some(1.0), Some(1.0))).await;

    let (status, body) = get(&app, "/api/vehicles").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["bus-1", "bus-2"]);
}

/// Malformed JSON → 400
#[tokio::test]
async fn test_malformed_event_returns_400() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/events")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

/// Realtime route exists; a plain GET without upgrade headers is rejected by the
/// upgrade extractor, not routed to 404
#[tokio::test]
async fn test_realtime_route_requires_upgrade() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/realtime-vehicle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.status().is_client_error());
}
