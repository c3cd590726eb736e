//! Preview producer configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Stylesheet injected into every envelope when none is configured.
pub const DEFAULT_STYLE: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.5.1/github-markdown.min.css";

/// Preview producer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    /// Stylesheet URI passed through to viewers
    #[serde(default = "default_style")]
    pub style: String,

    /// Idle timer period in milliseconds
    #[serde(default = "default_idle_interval")]
    pub idle_interval_ms: u64,

    /// Open the viewer page when preview starts
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,

    /// Viewer page URL; derived from the relay address when unset
    pub viewer_url: Option<String>,
}

impl PreviewConfig {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Validate preview configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.style.trim().is_empty() {
            return Err(ValidationError::MissingRequired("preview.style"));
        }
        if self.idle_interval_ms == 0 || self.idle_interval_ms > 60_000 {
            return Err(ValidationError::InvalidIdleInterval);
        }
        Ok(())
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            idle_interval_ms: default_idle_interval(),
            open_browser: default_open_browser(),
            viewer_url: None,
        }
    }
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

fn default_idle_interval() -> u64 {
    1000
}

fn default_open_browser() -> bool {
    true
}
