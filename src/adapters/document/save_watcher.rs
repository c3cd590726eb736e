//! Filesystem save events for a previewed file.
//!
//! Editors often save by writing a temporary file and renaming it over the
//! original, which replaces the inode. The parent directory is watched and
//! events are filtered by file name so both save styles are seen.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Emits `()` on the returned channel each time the file is written.
pub struct FileSaveWatcher {
    /// The underlying watcher (kept alive)
    _watcher: RecommendedWatcher,
}

impl FileSaveWatcher {
    /// Start watching `path`.
    ///
    /// Events are coalesced: a burst of writes may produce fewer signals,
    /// never zero.
    pub fn new(path: impl AsRef<Path>) -> Result<(Self, mpsc::Receiver<()>), notify::Error> {
        let path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let file_name = path.file_name().map(|n| n.to_os_string());
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, rx) = mpsc::channel(1);
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if is_save_of(&event, file_name.as_ref()) {
                        // Full channel means a signal is already pending.
                        let _ = tx.try_send(());
                    }
                }
                Err(e) => tracing::error!("File watcher error: {}", e),
            }
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Watching for saves");

        Ok((
            Self { _watcher: watcher },
            rx,
        ))
    }
}

fn is_save_of(event: &Event, file_name: Option<&OsString>) -> bool {
    match event.kind {
        EventKind::Modify(_) | EventKind::Create(_) => {}
        _ => return false,
    }
    let Some(file_name) = file_name else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
