use crate::query::{QueryError, QueryService, VehicleSnapshot};
use crate::realtime::protocol::{ClientMessage, HistoryMessage, LocationMessage, ServerMessage};
use crate::vehicle::VehicleId;
use axum::extract::ws::{Message, WebSocket};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Drives one realtime connection: its own sequence of broadcast rounds plus
/// subscribe/unsubscribe/history requests from the client
pub struct ConnectionManager {
    connection_id: Uuid,

    /// Vehicles this connection is subscribed to. Empty means all vehicles.
    subscriptions: HashSet<VehicleId>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connection_id: Uuid::now_v7(),
            subscriptions: HashSet::new(),
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(
        mut self,
        mut socket: WebSocket,
        query: Arc<QueryService>,
        round_interval: Duration,
    ) {
        info!(connection_id = %self.connection_id, "WebSocket connection established");

        let mut ticker = tokio::time::interval(round_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(reply) = self.handle_client_message(&text, &query).await {
                                if let Err(e) = send(&mut socket, &reply).await {
                                    error!(error = %e, "Failed to send reply");
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(connection_id = %self.connection_id, "WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    let round = query.broadcast_round().await;
                    if let Err(e) = self.send_round(&mut socket, &round).await {
                        debug!(connection_id = %self.connection_id, error = %e, "Write failed, ending broadcast loop");
                        break;
                    }
                }
            }
        }

        info!(connection_id = %self.connection_id, "WebSocket connection closed");
    }

    /// Apply a client request; returns the message to send back, if any
    async fn handle_client_message(
        &mut self,
        text: &str,
        query: &QueryService,
    ) -> Option<ServerMessage> {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "Malformed client message");
                return Some(ServerMessage::error(format!("invalid message: {}", e)));
            }
        };

        match msg {
            ClientMessage::Subscribe { id } => {
                info!(vehicle_id = %id, "Client subscribed to vehicle");
                self.subscriptions.insert(id);
                None
            }
            ClientMessage::Unsubscribe { id } => {
                info!(vehicle_id = %id, "Client unsubscribed from vehicle");
                self.subscriptions.remove(&id);
                None
            }
            ClientMessage::History { id } => match query.history_of(id.as_str()).await {
                Ok(positions) => Some(ServerMessage::History(HistoryMessage { id, positions })),
                Err(QueryError::UnknownVehicle(_)) => {
                    Some(ServerMessage::error(format!("vehicle {} not found", id)))
                }
                Err(e) => Some(ServerMessage::error(e.to_string())),
            },
        }
    }

    /// Messages for one round: one per positioned vehicle this connection wants
    fn round_messages(&self, round: &[VehicleSnapshot]) -> Vec<ServerMessage> {
        round
            .iter()
            .filter(|snapshot| self.should_forward(&snapshot.id))
            .filter_map(LocationMessage::from_snapshot)
            .map(ServerMessage::VehiclePosition)
            .collect()
    }

    fn should_forward(&self, id: &VehicleId) -> bool {
        self.subscriptions.is_empty() || self.subscriptions.contains(id)
    }

    async fn send_round(
        &self,
        socket: &mut WebSocket,
        round: &[VehicleSnapshot],
    ) -> anyhow::Result<()> {
        for msg in self.round_messages(round) {
            send(socket, &msg).await?;
        }
        Ok(())
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
