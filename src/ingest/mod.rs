// Ingestion router: feed events → directory → vehicle actors

use crate::directory::{SpawnError, VehicleResolver};
use crate::event::{ValidationError, VehicleEvent};
use crate::metrics::MetricsTracker;
use crate::vehicle::TellError;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, trace, warn};

#[cfg(test)]
mod tests;

/// Why a valid event could not be delivered
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DropReason {
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Tell(#[from] TellError),
}

/// What happened to one inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Update enqueued on the owning actor
    Applied,
    /// Invalid event, silently discarded
    Discarded(ValidationError),
    /// Valid event that could not be delivered
    Dropped(DropReason),
}

/// Routes validated position updates to their vehicle actors
///
/// The router is the only writer into the directory. It never reads actor
/// state and never waits for an update to be applied.
pub struct IngestionRouter {
    resolver: Arc<dyn VehicleResolver>,
    metrics: Arc<MetricsTracker>,
}

impl IngestionRouter {
    pub fn new(resolver: Arc<dyn VehicleResolver>, metrics: Arc<MetricsTracker>) -> Self {
        Self { resolver, metrics }
    }

    /// Route a single event (the per-event feed callback)
    pub fn route(&self, event: &VehicleEvent) -> RouteOutcome {
        self.metrics.record_received();

        let update = match event.validate() {
            Ok(update) => update,
            Err(e) => {
                trace!(vehicle_id = %event.vehicle_id, reason = %e, "Discarding event");
                self.metrics.record_discarded();
                return RouteOutcome::Discarded(e);
            }
        };

        let handle = match self.resolver.resolve(&update.vehicle_id) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(vehicle_id = %update.vehicle_id, error = %e, "Dropping event, actor unavailable");
                self.metrics.record_dropped();
                return RouteOutcome::Dropped(e.into());
            }
        };

        if let Err(e) = handle.update_position(update.latitude, update.longitude) {
            warn!(vehicle_id = %update.vehicle_id, error = %e, "Dropping event, update not enqueued");
            self.metrics.record_dropped();
            return RouteOutcome::Dropped(e.into());
        }

        self.metrics.record_applied();
        RouteOutcome::Applied
    }

    /// Drain an event stream through `route`. Returns the number of events seen.
    pub async fn run<S>(&self, events: S) -> u64
    where
        S: Stream<Item = VehicleEvent>,
    {
        let mut events = std::pin::pin!(events);
        let mut count = 0;

        while let Some(event) = events.next().await {
            self.route(&event);
            count += 1;
        }

        info!(events = count, "Event stream drained");
        count
    }
}
