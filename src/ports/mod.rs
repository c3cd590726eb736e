//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the preview core and the editor-side world. Adapters implement these ports.
//!
//! - `MarkdownRenderer` - Turns buffer text into an HTML fragment
//! - `DocumentSource` - Snapshots the buffer and viewport being previewed
//! - `SnapshotPublisher` - Pushes envelopes into the relay
//! - `BrowserLauncher` - Opens the viewer page

mod browser_launcher;
mod document_source;
mod markdown_renderer;
mod snapshot_publisher;

pub use browser_launcher::{BrowserError, BrowserLauncher};
pub use document_source::{DocumentError, DocumentSnapshot, DocumentSource};
pub use markdown_renderer::{MarkdownRenderer, RendererError};
pub use snapshot_publisher::{PublishError, SnapshotPublisher};
