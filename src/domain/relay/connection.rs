//! Viewer connection abstraction.
//!
//! The registry only needs to know who a connection is, whether it is still
//! open and how to hand it a payload. Transport details stay in adapters.

use thiserror::Error;

use crate::domain::foundation::ConnectionId;

/// Reasons a payload could not be handed to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Connection {0} is closed")]
    Closed(ConnectionId),
}

/// One registered connection as seen by the relay.
///
/// `deliver` must not block: implementations queue the payload for a writer
/// owned by the transport.
pub trait ViewerConnection: Send + Sync {
    /// Stable identity used for de-duplication and removal.
    fn id(&self) -> ConnectionId;

    /// Whether the underlying channel reports itself closed.
    fn is_closed(&self) -> bool;

    /// Queues one payload for this connection.
    fn deliver(&self, payload: &str) -> Result<(), DeliveryError>;
}
