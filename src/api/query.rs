use crate::query::{QueryError, QueryService};
use crate::realtime::{HistoryMessage, LocationMessage};
use crate::vehicle::{AskError, VehicleId};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Shared state for the vehicle query API
pub struct QueryAppState {
    pub query: Arc<QueryService>,
}

/// Query parameters for single-vehicle reads
#[derive(Deserialize)]
pub struct VehicleQueryParams {
    pub id: Option<String>,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create vehicle query router
pub fn create_query_router(state: Arc<QueryAppState>) -> Router {
    Router::new()
        .route("/vehicle", get(get_vehicle))
        .route("/vehicle/history", get(get_vehicle_history))
        .route("/api/vehicles", get(list_vehicles))
        .with_state(state)
}

/// GET /vehicle?id=... - Latest position of one vehicle
async fn get_vehicle(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<VehicleQueryParams>,
) -> Result<Json<LocationMessage>, ApiError> {
    let id = required_id(params)?;

    match state.query.latest_position_of(&id).await? {
        Some(position) => Ok(Json(LocationMessage::new(VehicleId::new(id), position))),
        None => Err(ApiError::NoPosition(id)),
    }
}

/// GET /vehicle/history?id=... - Retained positions of one vehicle, oldest first
async fn get_vehicle_history(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<VehicleQueryParams>,
) -> Result<Json<HistoryMessage>, ApiError> {
    let id = required_id(params)?;
    let positions = state.query.history_of(&id).await?;

    Ok(Json(HistoryMessage {
        id: VehicleId::new(id),
        positions,
    }))
}

/// GET /api/vehicles - One broadcast round, positioned vehicles only
async fn list_vehicles(State(state): State<Arc<QueryAppState>>) -> Json<Vec<LocationMessage>> {
    let mut vehicles: Vec<LocationMessage> = state
        .query
        .broadcast_round()
        .await
        .iter()
        .filter_map(LocationMessage::from_snapshot)
        .collect();
    vehicles.sort_by(|a, b| a.id.cmp(&b.id));

    Json(vehicles)
}

fn required_id(params: VehicleQueryParams) -> Result<String, ApiError> {
    match params.id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::MissingId),
    }
}

/// Query API error types
#[derive(Debug)]
enum ApiError {
    MissingId,
    NotFound(String),
    NoPosition(String),
    Timeout(String),
    Unavailable(String),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownVehicle(id) => ApiError::NotFound(id),
            QueryError::Ask(AskError::Timeout { id, .. }) => ApiError::Timeout(id.to_string()),
            QueryError::Ask(e) => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::MissingId => (
                StatusCode::BAD_REQUEST,
                "missing required query parameter: id".to_string(),
            ),
            ApiError::NotFound(id) => (StatusCode::NOT_FOUND, format!("vehicle {} not found", id)),
            ApiError::NoPosition(id) => (
                StatusCode::NOT_FOUND,
                format!("vehicle {} has no position yet", id),
            ),
            ApiError::Timeout(id) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("vehicle {} did not answer in time", id),
            ),
            ApiError::Unavailable(msg) => {
                warn!(error = %msg, "Vehicle query failed");
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
