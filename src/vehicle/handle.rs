use crate::vehicle::message::{Position, Reply, VehicleId, VehicleMessage};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

/// Tell failures. The message was not enqueued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TellError {
    #[error("mailbox for vehicle {id} is full")]
    MailboxFull { id: VehicleId },

    #[error("vehicle {id} is no longer running")]
    Closed { id: VehicleId },
}

/// Ask failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AskError {
    #[error("vehicle {id} did not answer within {timeout_ms} ms")]
    Timeout { id: VehicleId, timeout_ms: u64 },

    #[error("vehicle {id} is no longer running")]
    Closed { id: VehicleId },

    #[error("vehicle {id} did not handle '{kind}'")]
    Unhandled { id: VehicleId, kind: String },
}

/// Cloneable reference to a running vehicle actor
#[derive(Clone, Debug)]
pub struct VehicleHandle {
    id: VehicleId,
    mailbox: mpsc::Sender<VehicleMessage>,
}

impl VehicleHandle {
    pub(crate) fn new(id: VehicleId, mailbox: mpsc::Sender<VehicleMessage>) -> Self {
        Self { id, mailbox }
    }

    pub fn id(&self) -> &VehicleId {
        &self.id
    }

    /// True if both handles address the same actor
    pub fn same_actor(&self, other: &VehicleHandle) -> bool {
        self.mailbox.same_channel(&other.mailbox)
    }

    /// Fire-and-forget send. Never waits for mailbox space.
    pub fn tell(&self, message: VehicleMessage) -> Result<(), TellError> {
        self.mailbox.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => TellError::MailboxFull {
                id: self.id.clone(),
            },
            TrySendError::Closed(_) => TellError::Closed {
                id: self.id.clone(),
            },
        })
    }

    pub fn update_position(&self, latitude: f64, longitude: f64) -> Result<(), TellError> {
        self.tell(VehicleMessage::UpdatePosition {
            latitude,
            longitude,
        })
    }

    /// Request/response exchange bounded by `timeout`
    ///
    /// The reply channel is the correlation between request and answer. On
    /// timeout the receiver is dropped; the actor may still answer later and
    /// that answer is discarded.
    pub async fn ask<F>(&self, make: F, timeout: Duration) -> Result<Reply, AskError>
    where
        F: FnOnce(oneshot::Sender<Reply>) -> VehicleMessage,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let message = make(reply_tx);

        let exchange = async {
            self.mailbox
                .send(message)
                .await
                .map_err(|_| self.closed())?;
            reply_rx.await.map_err(|_| self.closed())
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(AskError::Timeout {
                id: self.id.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Last recorded position, or `None` if the vehicle has not reported one yet
    pub async fn latest_position(&self, timeout: Duration) -> Result<Option<Position>, AskError> {
        match self
            .ask(|reply| VehicleMessage::GetLatestPosition { reply }, timeout)
            .await?
        {
            Reply::LatestPosition(position) => Ok(position),
            other => Err(self.unexpected(other, "get_latest_position")),
        }
    }

    /// Retained positions in arrival order
    pub async fn position_history(&self, timeout: Duration) -> Result<Vec<Position>, AskError> {
        match self
            .ask(|reply| VehicleMessage::GetPositionHistory { reply }, timeout)
            .await?
        {
            Reply::PositionHistory(positions) => Ok(positions),
            other => Err(self.unexpected(other, "get_position_history")),
        }
    }

    fn closed(&self) -> AskError {
        AskError::Closed {
            id: self.id.clone(),
        }
    }

    fn unexpected(&self, reply: Reply, asked: &str) -> AskError {
        let kind = match reply {
            Reply::Unhandled { kind } => kind,
            _ => asked.to_string(),
        };
        AskError::Unhandled {
            id: self.id.clone(),
            kind,
        }
    }
}
