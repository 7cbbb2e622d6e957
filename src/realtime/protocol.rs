use crate::query::VehicleSnapshot;
use crate::vehicle::{Position, VehicleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Only receive positions for the subscribed vehicles
    Subscribe { id: VehicleId },
    Unsubscribe { id: VehicleId },
    /// One-off request for a vehicle's retained positions
    History { id: VehicleId },
}

/// Server → Client message types, sent as `{"type": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    VehiclePosition(LocationMessage),
    History(HistoryMessage),
    Error(ErrorMessage),
}

/// Latest position of one vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMessage {
    pub id: VehicleId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "observedAt")]
    pub observed_at: DateTime<Utc>,
}

impl LocationMessage {
    pub fn new(id: VehicleId, position: Position) -> Self {
        Self {
            id,
            latitude: position.latitude,
            longitude: position.longitude,
            observed_at: position.observed_at,
        }
    }

    /// `None` for vehicles that have not reported a position yet
    pub fn from_snapshot(snapshot: &VehicleSnapshot) -> Option<Self> {
        snapshot
            .position
            .map(|position| Self::new(snapshot.id.clone(), position))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryMessage {
    pub id: VehicleId,
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorMessage {
            message: message.into(),
        })
    }
}
