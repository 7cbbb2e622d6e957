use crate::event::VehicleEvent;
use crate::ingest::IngestionRouter;
use anyhow::{Context, Result};
use futures::{future, Stream, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Decode a raw feed payload into a vehicle event
pub fn decode_event(payload: &[u8]) -> Result<VehicleEvent, serde_json::Error> {
    serde_json::from_slice(payload)
}

/// Decode a stream of raw payloads, skipping (and logging) malformed ones
pub fn decode_stream<S, B>(payloads: S) -> impl Stream<Item = VehicleEvent>
where
    S: Stream<Item = B>,
    B: AsRef<[u8]>,
{
    payloads.filter_map(|payload| {
        future::ready(match decode_event(payload.as_ref()) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "Failed to deserialize vehicle event, skipping");
                None
            }
        })
    })
}

/// Subscribe to the vehicle feed and push every event through the router
///
/// Runs until the subscription ends. Malformed payloads are logged and skipped.
pub async fn run_subscriber(
    client: async_nats::Client,
    subject: String,
    router: Arc<IngestionRouter>,
) -> Result<()> {
    info!(subject = %subject, "Starting vehicle feed subscriber");

    let subscriber = client
        .subscribe(subject.clone())
        .await
        .with_context(|| format!("Failed to subscribe to '{}'", subject))?;

    let events = decode_stream(subscriber.map(|message| message.payload));
    router.run(events).await;

    warn!("Vehicle feed subscription ended");
    Ok(())
}
