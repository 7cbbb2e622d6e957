use crate::event::VehicleEvent;
use crate::ingest::{IngestionRouter, RouteOutcome};
use crate::vehicle::VehicleId;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Shared state for HTTP ingestion
pub struct IngestionAppState {
    pub router: Arc<IngestionRouter>,
}

/// Per-event ingestion result
#[derive(Debug, Serialize)]
struct EventResponse {
    #[serde(rename = "vehicleId")]
    vehicle_id: VehicleId,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl EventResponse {
    fn new(vehicle_id: VehicleId, outcome: &RouteOutcome) -> Self {
        let (outcome, error) = match outcome {
            RouteOutcome::Applied => ("applied", None),
            RouteOutcome::Discarded(e) => ("discarded", Some(e.to_string())),
            RouteOutcome::Dropped(e) => ("dropped", Some(e.to_string())),
        };
        Self {
            vehicle_id,
            outcome,
            error,
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Batch request
#[derive(Deserialize)]
struct BatchRequest {
    events: Vec<VehicleEvent>,
}

/// Batch response
#[derive(Debug, Serialize)]
struct BatchResponse {
    applied: usize,
    discarded: usize,
    dropped: usize,
    results: Vec<EventResponse>,
}

/// Create HTTP ingestion router
pub fn create_ingestion_router(state: Arc<IngestionAppState>) -> Router {
    Router::new()
        .route("/api/events", post(ingest_event))
        .route("/api/events/batch", post(ingest_batch))
        .with_state(state)
}

/// POST /api/events - Route a single position event
///
/// 202 when enqueued on the vehicle's actor, 422 when the event is invalid,
/// 503 when it could not be delivered.
async fn ingest_event(
    State(state): State<Arc<IngestionAppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let event: VehicleEvent =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidJson(e.to_string()))?;

    let outcome = state.router.route(&event);
    let status = match outcome {
        RouteOutcome::Applied => StatusCode::ACCEPTED,
        RouteOutcome::Discarded(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RouteOutcome::Dropped(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    Ok((status, Json(EventResponse::new(event.vehicle_id, &outcome))).into_response())
}

/// POST /api/events/batch - Route events in order, reporting each outcome
async fn ingest_batch(
    State(state): State<Arc<IngestionAppState>>,
    body: Bytes,
) -> Result<Json<BatchResponse>, AppError> {
    let request: BatchRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidJson(e.to_string()))?;

    if request.events.is_empty() {
        return Err(AppError::EmptyBatch);
    }

    debug!(count = request.events.len(), "Ingesting event batch");

    let mut response = BatchResponse {
        applied: 0,
        discarded: 0,
        dropped: 0,
        results: Vec::with_capacity(request.events.len()),
    };

    for event in request.events {
        let outcome = state.router.route(&event);
        match outcome {
            RouteOutcome::Applied => response.applied += 1,
            RouteOutcome::Discarded(_) => response.discarded += 1,
            RouteOutcome::Dropped(_) => response.dropped += 1,
        }
        response
            .results
            .push(EventResponse::new(event.vehicle_id, &outcome));
    }

    Ok(Json(response))
}

/// Ingestion error types
#[derive(Debug)]
enum AppError {
    InvalidJson(String),
    EmptyBatch,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match self {
            AppError::InvalidJson(msg) => format!("invalid event: {}", msg),
            AppError::EmptyBatch => "Batch request must contain at least one event".to_string(),
        };

        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
    }
}
