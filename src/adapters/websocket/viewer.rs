//! Viewer handle - the registry's view of one upgraded socket.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{DeliveryError, ViewerConnection};

/// Payloads a connection may have queued before further updates are dropped.
///
/// Each envelope supersedes the previous one, so a stalled writer only ever
/// needs the newest few.
pub const OUTBOX_CAPACITY: usize = 16;

/// Sending half of a connection's outbox.
///
/// The socket writer task owns the receiving half. Once that task exits the
/// channel reports closed and the registry prunes the handle.
#[derive(Debug, Clone)]
pub struct ViewerHandle {
    id: ConnectionId,
    outbox: mpsc::Sender<String>,
}

impl ViewerHandle {
    /// Create a handle together with the outbox its writer drains.
    pub fn channel() -> (Self, mpsc::Receiver<String>) {
        let (outbox, rx) = mpsc::channel(OUTBOX_CAPACITY);
        (
            Self {
                id: ConnectionId::new(),
                outbox,
            },
            rx,
        )
    }
}

impl ViewerConnection for ViewerHandle {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }

    fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        match self.outbox.try_send(payload.to_owned()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                // Writer is behind; a later envelope will supersede this one.
                tracing::debug!(connection_id = %self.id, "Outbox full, update dropped");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed(self.id)),
        }
    }
}
