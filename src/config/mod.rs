use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub use crate::nats::NatsConfig;

/// Complete fleetmap configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub actor: ActorConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Apply environment overrides on top of file values.
    ///
    /// `RENDER=true` binds the hosting platform's public address and wins over
    /// `FLEETMAP_HOST` / `FLEETMAP_PORT`.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("FLEETMAP_HOST") {
            if !v.is_empty() {
                self.host = v;
            }
        }
        if let Ok(v) = std::env::var("FLEETMAP_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.port = port;
            }
        }
        if std::env::var("RENDER").map_or(false, |v| v == "true") {
            self.host = "0.0.0.0".to_string();
            self.port = 10000;
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Vehicle actor and directory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ActorConfig {
    /// Bounded mailbox size per vehicle
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Initialization attempts before a spawn is abandoned
    #[serde(default = "default_spawn_max_retries")]
    pub spawn_max_retries: u32,
    /// Keep only the last N positions per vehicle (unset = unbounded)
    #[serde(default)]
    pub history_limit: Option<usize>,
}

fn default_mailbox_capacity() -> usize {
    1_000_000
}

fn default_spawn_max_retries() -> u32 {
    3
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            spawn_max_retries: default_spawn_max_retries(),
            history_limit: None,
        }
    }
}

/// Query service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// How long an ask waits for an actor's reply (milliseconds)
    #[serde(default = "default_ask_timeout_ms")]
    pub ask_timeout_ms: u64,
}

fn default_ask_timeout_ms() -> u64 {
    1000
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            ask_timeout_ms: default_ask_timeout_ms(),
        }
    }
}

impl QueryConfig {
    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }
}

/// Realtime feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Delay between snapshot rounds for each realtime client (milliseconds)
    #[serde(default = "default_round_interval_ms")]
    pub round_interval_ms: u64,
}

fn default_round_interval_ms() -> u64 {
    250
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            round_interval_ms: default_round_interval_ms(),
        }
    }
}

impl BroadcastConfig {
    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms.max(1))
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<FleetConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: FleetConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    Ok(config)
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_or_default(path: impl AsRef<Path>) -> Result<FleetConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        Ok(FleetConfig::default())
    }
}
