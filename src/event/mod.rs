use crate::vehicle::VehicleId;
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{validate, PositionUpdate, ValidationError};

/// VehicleEvent is one position report from the vehicle feed.
///
/// The feed may report partial coordinates; such events are discarded by
/// validation before they reach any actor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleEvent {
    /// Vehicle the report belongs to
    #[serde(rename = "vehicleId")]
    pub vehicle_id: VehicleId,

    /// Reported coordinates (either may be absent)
    #[serde(default)]
    pub position: ReportedPosition,
}

/// Coordinates as reported by the feed
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedPosition {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl VehicleEvent {
    pub fn new(
        vehicle_id: impl Into<VehicleId>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            position: ReportedPosition {
                latitude,
                longitude,
            },
        }
    }

    /// Validates the event and extracts the update to apply.
    ///
    /// Returns Err(ValidationError) when the event must be discarded.
    pub fn validate(&self) -> Result<PositionUpdate, ValidationError> {
        validation::validate(self)
    }
}
