//! File-backed document source.
//!
//! Stands in for an editor buffer when previewing a file edited elsewhere.
//! A file carries no cursor, so the cursor is placed on the first line that
//! changed since the previous snapshot; the preview then follows edits.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{DocumentError, DocumentSnapshot, DocumentSource};

#[derive(Default)]
struct LastRead {
    text: Option<String>,
    cursor_line: usize,
}

/// Reads the previewed document from disk on every snapshot.
pub struct FileDocument {
    path: PathBuf,
    visible_lines: usize,
    last: Mutex<LastRead>,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            visible_lines: 0,
            last: Mutex::new(LastRead {
                text: None,
                cursor_line: 1,
            }),
        }
    }

    /// Pretend an editor window of this height, centring the scroll hint.
    pub fn with_visible_lines(mut self, visible_lines: usize) -> Self {
        self.visible_lines = visible_lines;
        self
    }
}

#[async_trait]
impl DocumentSource for FileDocument {
    async fn snapshot(&self) -> Result<DocumentSnapshot, DocumentError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| DocumentError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
        let text = String::from_utf8(bytes).map_err(|e| DocumentError::Encoding(e.to_string()))?;

        let mut last = self.last.lock().await;
        if let Some(previous) = &last.text {
            if let Some(line) = first_changed_line(previous, &text) {
                last.cursor_line = line;
            }
        }
        last.text = Some(text.clone());

        Ok(DocumentSnapshot::new(
            text,
            last.cursor_line,
            self.visible_lines,
        ))
    }
}

/// 1-based index of the first line that differs, `None` when identical.
fn first_changed_line(previous: &str, current: &str) -> Option<usize> {
    if previous == current {
        return None;
    }
    let mut old = previous.lines();
    let mut new = current.lines();
    let mut line: usize = 1;
    loop {
        match (old.next(), new.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (None, None) => return Some(line.saturating_sub(1).max(1)),
            _ => return Some(line),
        }
    }
}
