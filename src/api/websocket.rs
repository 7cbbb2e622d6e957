use crate::metrics::MetricsTracker;
use crate::query::QueryService;
use crate::realtime::ConnectionManager;
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared application state for WebSocket handler
#[derive(Clone)]
pub struct WsAppState {
    pub query: Arc<QueryService>,
    pub metrics: Arc<MetricsTracker>,
    /// Delay between broadcast rounds for each connection
    pub round_interval: Duration,
}

/// GET /realtime-vehicle - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Create WebSocket router
pub fn create_ws_router(state: Arc<WsAppState>) -> Router {
    Router::new()
        .route("/realtime-vehicle", get(ws_handler))
        .with_state(state)
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>) {
    state.metrics.increment_ws_connection();

    ConnectionManager::new()
        .handle(socket, Arc::clone(&state.query), state.round_interval)
        .await;

    state.metrics.decrement_ws_connection();
}
