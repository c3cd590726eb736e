//! Snapshot Publisher Port - the producer's outbound link.
//!
//! The application layer pushes envelopes through this port without knowing
//! the transport. Sends are best effort: a missed update is healed by the
//! next one because every envelope carries the full document.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::preview::SnapshotEnvelope;

/// Port for pushing envelopes to the relay.
///
/// # Contract
///
/// Implementations must:
/// - Make `connect` a no-op while a live link exists
/// - Never fail `publish`; report whether the envelope was queued instead
/// - Reopen the link on the next `connect` after it dropped
#[async_trait]
pub trait SnapshotPublisher: Send + Sync {
    /// Ensure a live link exists, opening one if needed.
    async fn connect(&self) -> Result<(), PublishError>;

    /// Queue one envelope. Returns `false` when it was dropped.
    async fn publish(&self, envelope: &SnapshotEnvelope) -> bool;

    /// Tear the link down. Idempotent.
    async fn close(&self);
}

/// Errors that can occur while opening the link.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("Relay unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },
}
