//! Preview command handlers.

mod publish_snapshot;

pub use publish_snapshot::{
    PublishSnapshotCommand, PublishSnapshotHandler, PublishSnapshotResult, PublishTrigger,
};
