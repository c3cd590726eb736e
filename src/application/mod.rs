//! Application layer - preview commands and their handlers.
//!
//! `PreviewSession` is the entry point for the editor integration; it
//! drives `PublishSnapshotHandler` from the idle timer and save hook.

mod errors;
pub mod handlers;
mod preview_session;

pub use errors::PreviewError;
pub use handlers::preview::{
    PublishSnapshotCommand, PublishSnapshotHandler, PublishSnapshotResult, PublishTrigger,
};
pub use preview_session::PreviewSession;
