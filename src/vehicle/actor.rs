use crate::vehicle::handle::VehicleHandle;
use crate::vehicle::message::{Outcome, Position, Reply, VehicleId, VehicleMessage};
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

/// Reasons an actor refuses to start
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    #[error("vehicle id must not be empty")]
    EmptyId,

    #[error("history limit must be at least 1")]
    ZeroHistoryLimit,

    #[error("initialization rejected: {0}")]
    Rejected(String),
}

/// Lifecycle state of a vehicle actor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorStatus {
    /// Created, start hook not yet run
    Uninitialized,
    /// Accepting messages
    Running,
}

/// Owns the state of one vehicle and processes its mailbox sequentially
#[derive(Debug)]
pub struct VehicleActor {
    /// Recorded by the start hook from the directory key
    id: VehicleId,

    /// Append-only, in arrival order; trimmed from the front when bounded
    history: VecDeque<Position>,

    /// Keep at most this many positions (None = unbounded)
    history_limit: Option<usize>,

    status: ActorStatus,
}

impl VehicleActor {
    /// Create an uninitialized actor
    pub fn new(history_limit: Option<usize>) -> Self {
        Self {
            id: VehicleId::default(),
            history: VecDeque::new(),
            history_limit,
            status: ActorStatus::Uninitialized,
        }
    }

    pub fn id(&self) -> &VehicleId {
        &self.id
    }

    pub fn status(&self) -> ActorStatus {
        self.status
    }

    /// Start hook: record identity, reset state, move to running
    pub fn pre_start(&mut self, id: VehicleId) -> Result<(), InitError> {
        if id.is_empty() {
            return Err(InitError::EmptyId);
        }
        if self.history_limit == Some(0) {
            return Err(InitError::ZeroHistoryLimit);
        }

        self.id = id;
        self.history.clear();
        self.status = ActorStatus::Running;

        debug!(vehicle_id = %self.id, "Vehicle actor started");
        Ok(())
    }

    /// Stop hook. State is not persisted.
    pub fn post_stop(&mut self) {
        debug!(
            vehicle_id = %self.id,
            discarded_positions = self.history.len(),
            "Vehicle actor stopped"
        );
    }

    /// Process one message
    pub fn handle_message(&mut self, message: VehicleMessage) -> Outcome {
        if self.status != ActorStatus::Running {
            warn!(kind = %message.kind(), "Message delivered to uninitialized actor");
            return Outcome::Unhandled;
        }

        match message {
            VehicleMessage::UpdatePosition {
                latitude,
                longitude,
            } => {
                self.append(Position::now(latitude, longitude));
                Outcome::Handled
            }
            VehicleMessage::GetLatestPosition { reply } => {
                respond(reply, Reply::LatestPosition(self.history.back().copied()));
                Outcome::Handled
            }
            VehicleMessage::GetPositionHistory { reply } => {
                respond(
                    reply,
                    Reply::PositionHistory(self.history.iter().copied().collect()),
                );
                Outcome::Handled
            }
            VehicleMessage::Unrecognized { kind, reply } => {
                debug!(vehicle_id = %self.id, kind = %kind, "Unhandled message");
                if let Some(reply) = reply {
                    respond(reply, Reply::Unhandled { kind });
                }
                Outcome::Unhandled
            }
        }
    }

    fn append(&mut self, position: Position) {
        trace!(
            vehicle_id = %self.id,
            latitude = position.latitude,
            longitude = position.longitude,
            "Position updated"
        );
        self.history.push_back(position);

        if let Some(limit) = self.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Move a started actor onto its own task and return a handle to its mailbox
    pub(crate) fn spawn(self, mailbox_capacity: usize) -> VehicleHandle {
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        let id = self.id.clone();
        tokio::spawn(self.run(rx));
        VehicleHandle::new(id, tx)
    }

    /// Mailbox loop. Ends when every handle has been dropped.
    async fn run(mut self, mut mailbox: mpsc::Receiver<VehicleMessage>) {
        while let Some(message) = mailbox.recv().await {
            self.handle_message(message);
        }
        self.post_stop();
    }
}

/// Send a reply. An asker that already timed out has dropped its receiver.
fn respond(reply: oneshot::Sender<Reply>, value: Reply) {
    let _ = reply.send(value);
}
