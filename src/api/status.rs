use crate::metrics::{MetricsSnapshot, MetricsTracker};
use crate::query::QueryService;
use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for health and status endpoints
pub struct StatusAppState {
    pub query: Arc<QueryService>,
    pub metrics: Arc<MetricsTracker>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Registered vehicle actors
    pub vehicles: usize,
    pub metrics: MetricsSnapshot,
}

pub fn create_status_router(state: Arc<StatusAppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .with_state(state)
}

/// GET /health - Liveness
async fn health() -> &'static str {
    "ok"
}

/// GET /api/status - Vehicle count and ingestion/connection counters
async fn status(State(state): State<Arc<StatusAppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        vehicles: state.query.live_count(),
        metrics: state.metrics.get_snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActorConfig;
    use crate::directory::ActorDirectory;
    use crate::vehicle::VehicleId;
    use std::time::Duration;

    #[tokio::test]
    async fn test_status_counts_vehicles() {
        let directory = Arc::new(ActorDirectory::new(&ActorConfig::default()));
        directory.resolve(&VehicleId::from("bus-1")).unwrap();
        directory.resolve(&VehicleId::from("bus-2")).unwrap();

        let metrics = Arc::new(MetricsTracker::new());
        metrics.increment_ws_connection();

        let state = Arc::new(StatusAppState {
            query: Arc::new(QueryService::new(directory, Duration::from_secs(1))),
            metrics,
        });

        let result = status(State(state)).await;

        assert_eq!(result.0.vehicles, 2);
        assert_eq!(result.0.metrics.websocket_connections, 1);
    }
}
