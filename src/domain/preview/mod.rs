//! Snapshot delivery protocol: envelope layout and scroll hint.

mod envelope;
mod scroll;

pub use envelope::{EnvelopeError, ReceivedSnapshot, SnapshotEnvelope};
pub use scroll::ScrollPosition;
