// HTTP and WebSocket APIs

mod ingestion;
pub mod query;
pub mod status;
pub mod websocket;

pub use ingestion::{create_ingestion_router, IngestionAppState};
pub use query::{create_query_router, QueryAppState};
pub use status::{create_status_router, StatusAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use crate::ingest::IngestionRouter;
use crate::metrics::MetricsTracker;
use crate::query::QueryService;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;

/// Services shared by every HTTP route
#[derive(Clone)]
pub struct AppServices {
    pub router: Arc<IngestionRouter>,
    pub query: Arc<QueryService>,
    pub metrics: Arc<MetricsTracker>,
    pub round_interval: Duration,
}

/// Merge all API routers into one application
pub fn create_app(services: AppServices) -> Router {
    let ingestion_state = Arc::new(IngestionAppState {
        router: Arc::clone(&services.router),
    });
    let query_state = Arc::new(QueryAppState {
        query: Arc::clone(&services.query),
    });
    let status_state = Arc::new(StatusAppState {
        query: Arc::clone(&services.query),
        metrics: Arc::clone(&services.metrics),
    });
    let ws_state = Arc::new(WsAppState {
        query: services.query,
        metrics: services.metrics,
        round_interval: services.round_interval,
    });

    Router::new()
        .merge(create_ingestion_router(ingestion_state))
        .merge(create_query_router(query_state))
        .merge(create_status_router(status_state))
        .merge(create_ws_router(ws_state))
}
