//! Relay hub - registry membership plus the last relayed payload.
//!
//! Every mutation and every broadcast pass goes through one mutex, so a join
//! never interleaves with a broadcast and each update is dispatched to all
//! members in a single pass. Deliveries only enqueue into per-connection
//! outboxes; no socket I/O happens while the lock is held.
//!
//! ```text
//!            relay(payload)
//!                  │
//!                  ▼
//! ┌──────────────────────────────────┐
//! │ RelayHub (Mutex)                 │
//! │  last_payload ◄── cached         │
//! │  registry ──► outbox per viewer  │
//! └──────────────────────────────────┘
//!        │            │            │
//!        ▼            ▼            ▼
//!    viewer-a     viewer-b     producer
//! ```

use tokio::sync::Mutex;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{ConnectionRegistry, DeliveryReport, ViewerConnection};

use super::viewer::ViewerHandle;

struct HubState {
    registry: ConnectionRegistry<ViewerHandle>,
    last_payload: Option<String>,
    closed: bool,
}

/// Fan-out hub shared by every connection of one relay server.
pub struct RelayHub {
    state: Mutex<HubState>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState {
                registry: ConnectionRegistry::new(),
                last_payload: None,
                closed: false,
            }),
        }
    }

    /// Register a connection and send it the join snapshot.
    ///
    /// The join snapshot is the last relayed payload, delivered to this
    /// connection only. Returns whether one was sent; nothing is sent when
    /// no payload has been relayed yet.
    ///
    /// After [`RelayHub::close_all`] the handle is dropped instead, which
    /// closes the connection's socket.
    pub async fn join(&self, viewer: ViewerHandle) -> bool {
        let mut state = self.state.lock().await;
        let id = viewer.id();
        if state.closed {
            tracing::debug!(connection_id = %id, "Hub closed, connection refused");
            return false;
        }

        let snapshot_sent = match &state.last_payload {
            Some(payload) => viewer.deliver(payload).is_ok(),
            None => false,
        };
        state.registry.add(viewer);

        tracing::debug!(
            connection_id = %id,
            viewers = state.registry.len(),
            snapshot_sent,
            "Connection joined"
        );
        snapshot_sent
    }

    /// Remove a connection. No-op when it is not registered.
    pub async fn leave(&self, id: &ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.registry.remove(id);
        if removed {
            tracing::debug!(connection_id = %id, viewers = state.registry.len(), "Connection left");
        }
        removed
    }

    /// Cache `payload` and forward it unmodified to every registered
    /// connection, the sender included.
    pub async fn relay(&self, payload: String) -> DeliveryReport {
        let mut state = self.state.lock().await;
        state.registry.prune_closed();
        let report = state.registry.for_each(|viewer| viewer.deliver(&payload));
        state.last_payload = Some(payload);
        report
    }

    /// Number of open connections, producer link included.
    pub async fn connection_count(&self) -> usize {
        let mut state = self.state.lock().await;
        state.registry.prune_closed();
        state.registry.len()
    }

    /// Payload a newly joining connection would receive.
    pub async fn last_payload(&self) -> Option<String> {
        self.state.lock().await.last_payload.clone()
    }

    /// Drop every connection and refuse later joins. Writers observe the
    /// closed outbox and close the sockets. Returns how many were dropped.
    pub async fn close_all(&self) -> usize {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.registry.clear().len()
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}
