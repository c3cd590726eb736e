//! Document adapters - the file-backed stand-in for an editor buffer.

mod file_document;
mod save_watcher;

pub use file_document::FileDocument;
pub use save_watcher::FileSaveWatcher;
