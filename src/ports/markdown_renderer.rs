//! Markdown Renderer Port - Buffer-to-HTML conversion interface.
//!
//! The relay never looks inside rendered content. This port lets the
//! application layer turn editor text into the HTML body of an envelope
//! without depending on a particular markdown engine.

use async_trait::async_trait;
use thiserror::Error;

/// Port for rendering markdown source into an HTML fragment.
///
/// # Contract
///
/// Implementations must:
/// - Return a body fragment (no `<html>`/`<head>` wrapper)
/// - Render the full document on every call (no incremental output)
///
/// # Usage
///
/// ```rust,ignore
/// let renderer: &dyn MarkdownRenderer = get_renderer();
/// let html = renderer.render("# Title\n\nBody").await?;
/// ```
#[async_trait]
pub trait MarkdownRenderer: Send + Sync {
    /// Render markdown text into an HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns `RendererError` if the engine cannot produce output.
    async fn render(&self, markdown: &str) -> Result<String, RendererError>;
}

/// Errors that can occur while rendering.
#[derive(Debug, Clone, Error)]
pub enum RendererError {
    #[error("Rendering failed: {0}")]
    Failed(String),
}
