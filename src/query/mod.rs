// Query service: point reads and broadcast rounds over vehicle actors

use crate::directory::VehicleLookup;
use crate::vehicle::{AskError, Position, VehicleId};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;


/// Query failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// No actor exists for the id
    #[error("vehicle {0} is unknown")]
    UnknownVehicle(String),

    /// Actor exists but did not answer (timeout, stopped, or unhandled)
    #[error(transparent)]
    Ask(#[from] AskError),
}

/// One vehicle's answer within a broadcast round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    /// `None` when the vehicle has not reported a valid position yet
    pub position: Option<Position>,
}

/// Answers point queries and builds broadcast rounds
///
/// Every read goes through the actor's mailbox with a bounded wait; nothing
/// here touches vehicle state directly.
pub struct QueryService {
    directory: Arc<dyn VehicleLookup>,
    ask_timeout: Duration,
}

impl QueryService {
    pub fn new(directory: Arc<dyn VehicleLookup>, ask_timeout: Duration) -> Self {
        Self {
            directory,
            ask_timeout,
        }
    }

    pub fn ask_timeout(&self) -> Duration {
        self.ask_timeout
    }

    /// Number of registered vehicles
    pub fn live_count(&self) -> usize {
        self.directory.live_count()
    }

    /// Latest position of `id`. `Ok(None)` means the vehicle exists but has no position yet.
    pub async fn latest_position_of(&self, id: &str) -> Result<Option<Position>, QueryError> {
        let handle = self
            .directory
            .lookup(id)
            .ok_or_else(|| QueryError::UnknownVehicle(id.to_string()))?;

        Ok(handle.latest_position(self.ask_timeout).await?)
    }

    /// Retained positions of `id` in arrival order
    pub async fn history_of(&self, id: &str) -> Result<Vec<Position>, QueryError> {
        let handle = self
            .directory
            .lookup(id)
            .ok_or_else(|| QueryError::UnknownVehicle(id.to_string()))?;

        Ok(handle.position_history(self.ask_timeout).await?)
    }

    /// Ask every live vehicle for its latest position concurrently.
    ///
    /// Vehicles that fail to answer within the timeout are left out of the
    /// round; they are not retried.
    pub async fn broadcast_round(&self) -> Vec<VehicleSnapshot> {
        let handles = self.directory.list_live();
        let timeout = self.ask_timeout;

        let answers = join_all(handles.iter().map(|handle| async move {
            (handle.id().clone(), handle.latest_position(timeout).await)
        }))
        .await;

        answers
            .into_iter()
            .filter_map(|(id, answer)| match answer {
                Ok(position) => Some(VehicleSnapshot { id, position }),
                Err(e) => {
                    debug!(vehicle_id = %id, error = %e, "Vehicle omitted from round");
                    None
                }
            })
            .collect()
    }
}
