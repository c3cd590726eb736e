//! Document Source Port - read access to the editor buffer being previewed.
//!
//! The editor integration owns the buffer. The application layer only asks
//! for a point-in-time snapshot of its text and viewport whenever a trigger
//! fires (idle timer tick or save event).

use async_trait::async_trait;
use thiserror::Error;

/// Point-in-time view of the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentSnapshot {
    /// Full markdown source.
    pub text: String,
    /// 1-based line of the cursor.
    pub cursor_line: usize,
    /// Number of lines visible in the editor window.
    pub visible_lines: usize,
}

impl DocumentSnapshot {
    pub fn new(text: impl Into<String>, cursor_line: usize, visible_lines: usize) -> Self {
        Self {
            text: text.into(),
            cursor_line,
            visible_lines,
        }
    }

    /// Number of lines in the buffer.
    pub fn total_lines(&self) -> usize {
        self.text.lines().count()
    }
}

/// Port for reading the buffer being previewed.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Capture the current buffer state.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the buffer cannot be read.
    async fn snapshot(&self) -> Result<DocumentSnapshot, DocumentError>;
}

/// Errors that can occur while reading the buffer.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(String),
}
