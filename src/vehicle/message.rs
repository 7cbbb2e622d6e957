use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use tokio::sync::oneshot;

/// Opaque identifier of one physical vehicle (e.g., "bus-7", "tram-1204")
///
/// Used as the directory key; stable for the lifetime of the vehicle's actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for VehicleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A recorded vehicle position. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,

    /// When the actor recorded the position (arrival time, not producer time)
    #[serde(rename = "observedAt")]
    pub observed_at: DateTime<Utc>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            observed_at,
        }
    }

    /// Position observed now
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Utc::now())
    }
}

/// Messages understood by a vehicle actor
///
/// Tells carry no reply channel; asks carry a oneshot sender that the actor
/// answers exactly once.
#[derive(Debug)]
pub enum VehicleMessage {
    /// Append a position observed now (tell)
    UpdatePosition { latitude: f64, longitude: f64 },

    /// Reply with the last recorded position, if any (ask)
    GetLatestPosition { reply: oneshot::Sender<Reply> },

    /// Reply with every retained position in arrival order (ask)
    GetPositionHistory { reply: oneshot::Sender<Reply> },

    /// A message kind this actor version does not implement.
    /// Answered with `Reply::Unhandled` when a reply channel is present.
    Unrecognized {
        kind: String,
        reply: Option<oneshot::Sender<Reply>>,
    },
}

impl VehicleMessage {
    /// Wire name of the message kind (used in logs and unhandled replies)
    pub fn kind(&self) -> &str {
        match self {
            VehicleMessage::UpdatePosition { .. } => "update_position",
            VehicleMessage::GetLatestPosition { .. } => "get_latest_position",
            VehicleMessage::GetPositionHistory { .. } => "get_position_history",
            VehicleMessage::Unrecognized { kind, .. } => kind,
        }
    }
}

/// Replies to ask-style messages
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// `None` when no position has been recorded yet
    LatestPosition(Option<Position>),
    PositionHistory(Vec<Position>),
    Unhandled { kind: String },
}

/// Result of processing a single message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Unhandled,
}
