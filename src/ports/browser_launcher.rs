//! Browser Launcher Port - opens the viewer page for the user.

use thiserror::Error;

/// Port for opening a URL in the user's browser.
pub trait BrowserLauncher: Send + Sync {
    /// Open `url` in the default browser.
    ///
    /// Independent of relay state: the page simply retries its connection
    /// when the relay is not up yet.
    fn open(&self, url: &str) -> Result<(), BrowserError>;
}

/// Errors that can occur while launching a browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser for {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: std::io::Error,
    },
}
