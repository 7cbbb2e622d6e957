use anyhow::{Context, Result};
use fleetmap::api::{create_app, AppServices};
use fleetmap::config::load_or_default;
use fleetmap::directory::ActorDirectory;
use fleetmap::ingest::IngestionRouter;
use fleetmap::metrics::MetricsTracker;
use fleetmap::nats::{connect, run_subscriber};
use fleetmap::query::QueryService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetmap=info".into()),
        )
        .init();

    info!("Fleetmap starting...");

    let config_path =
        std::env::var("FLEETMAP_CONFIG").unwrap_or_else(|_| "fleetmap.toml".to_string());
    let mut config = load_or_default(&config_path)?;
    config.server.apply_env();

    info!(
        config_path = %config_path,
        mailbox_capacity = config.actor.mailbox_capacity,
        spawn_max_retries = config.actor.spawn_max_retries,
        ask_timeout_ms = config.query.ask_timeout_ms,
        "Configuration loaded"
    );

    let metrics = Arc::new(MetricsTracker::new());
    let directory = Arc::new(ActorDirectory::new(&config.actor));
    let router = Arc::new(IngestionRouter::new(directory.clone(), metrics.clone()));
    let query = Arc::new(QueryService::new(
        directory.clone(),
        config.query.ask_timeout(),
    ));

    // Event feed
    if config.nats.enabled {
        let client = connect(&config.nats)
            .await
            .context("Failed to connect to NATS")?;
        let subject = config.nats.subject.clone();
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            if let Err(e) = run_subscriber(client, subject, router).await {
                error!(error = %e, "NATS subscriber stopped");
            }
        });
    } else {
        warn!("NATS feed disabled, only HTTP ingestion is available");
    }

    let app = create_app(AppServices {
        router,
        query,
        metrics,
        round_interval: config.broadcast.round_interval(),
    })
    .layer(CorsLayer::permissive());

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    directory.shutdown();
    info!("Fleetmap stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl_c signal");
    }
    info!("Shutdown signal received");
}
