use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks ingestion and realtime connection counters
#[derive(Default)]
pub struct MetricsTracker {
    /// Events seen by the router (lifetime counter)
    events_received: AtomicU64,

    /// Events forwarded to an actor
    events_applied: AtomicU64,

    /// Events discarded by validation (expected feed noise)
    events_discarded: AtomicU64,

    /// Valid events dropped because of spawn or mailbox failures
    events_dropped: AtomicU64,

    /// Open realtime connections
    websocket_connections: AtomicU64,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.events_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment WebSocket connection count
    pub fn increment_ws_connection(&self) {
        self.websocket_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement WebSocket connection count
    pub fn decrement_ws_connection(&self) {
        self.websocket_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get_ws_connection_count(&self) -> u64 {
        self.websocket_connections.load(Ordering::Relaxed)
    }

    /// Get snapshot of all counters
    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_applied: self.events_applied.load(Ordering::Relaxed),
            events_discarded: self.events_discarded.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            websocket_connections: self.get_ws_connection_count(),
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_applied: u64,
    pub events_discarded: u64,
    pub events_dropped: u64,
    pub websocket_connections: u64,
}
