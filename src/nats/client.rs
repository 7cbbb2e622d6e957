use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// NATS configuration for the vehicle position feed
#[derive(Clone, Debug, Deserialize)]
pub struct NatsConfig {
    /// Subscribe to the feed on startup
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_url")]
    pub url: String,
    /// Subject (wildcards allowed) carrying JSON vehicle events
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_enabled() -> bool {
    true
}

fn default_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
}

fn default_subject() -> String {
    "vehicles.positions.>".to_string()
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            url: default_url(),
            subject: default_subject(),
        }
    }
}

/// Connect to the NATS server
pub async fn connect(config: &NatsConfig) -> Result<async_nats::Client> {
    info!("Connecting to NATS at {}", config.url);

    let client = async_nats::connect(&config.url)
        .await
        .context("Failed to connect to NATS")?;

    info!("Connected to NATS");
    Ok(client)
}
