use super::VehicleEvent;
use crate::vehicle::VehicleId;
use thiserror::Error;

/// Reasons a vehicle event is discarded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("vehicleId is required")]
    MissingVehicleId,
    #[error("latitude is missing")]
    MissingLatitude,
    #[error("longitude is missing")]
    MissingLongitude,
}

/// A validated update, ready to be sent to the owning actor
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub vehicle_id: VehicleId,
    pub latitude: f64,
    pub longitude: f64,
}

/// Validates a VehicleEvent.
///
/// Validation rules:
/// - vehicleId: must be non-empty
/// - position: latitude and longitude must both be present
pub fn validate(event: &VehicleEvent) -> Result<PositionUpdate, ValidationError> {
    if event.vehicle_id.is_empty() {
        return Err(ValidationError::MissingVehicleId);
    }

    let latitude = event
        .position
        .latitude
        .ok_or(ValidationError::MissingLatitude)?;
    let longitude = event
        .position
        .longitude
        .ok_or(ValidationError::MissingLongitude)?;

    Ok(PositionUpdate {
        vehicle_id: event.vehicle_id.clone(),
        latitude,
        longitude,
    })
}
