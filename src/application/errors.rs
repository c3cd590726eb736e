//! Application-level error type for preview commands.

use thiserror::Error;

use crate::adapters::websocket::RelayError;
use crate::ports::{BrowserError, DocumentError, PublishError, RendererError};

/// Errors surfaced by preview commands.
///
/// None of these are fatal to the host: trigger-driven paths log them and
/// keep the session running.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Render(#[from] RendererError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("Preview has not been started")]
    NotStarted,
}
