//! Default system browser via the `webbrowser` crate.

use crate::ports::{BrowserError, BrowserLauncher};

/// Opens URLs in the user's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        tracing::info!(url, "Opening viewer page");
        webbrowser::open(url).map_err(|source| BrowserError::Launch {
            url: url.to_string(),
            source,
        })
    }
}
