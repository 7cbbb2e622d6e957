// HTTP and WebSocket APIs
pub mod api;

// Configuration file and environment overrides
pub mod config;

// Vehicle id → actor registry
pub mod directory;

// Event model and validation
pub mod event;

// Feed events → vehicle actors
pub mod ingest;

// Ingestion and connection counters
pub mod metrics;

// NATS client integration
pub mod nats;

// Point queries and broadcast rounds
pub mod query;

// Realtime WebSocket feed
pub mod realtime;

// Per-vehicle state actors
pub mod vehicle;
