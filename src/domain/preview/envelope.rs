//! Snapshot envelope - the single message kind carried over every connection.
//!
//! Every envelope is self-contained: stylesheet reference, scroll hint and the
//! full rendered document. A receiver that missed earlier envelopes is fully
//! caught up by the latest one.
//!
//! # Wire format
//!
//! ```text
//! <div>
//!   <span id="style">STYLE_URI</span>
//!   <span id="position-percentage">INT</span>
//!   <div id="content">RENDERED_HTML</div>
//! </div>
//! ```

use thiserror::Error;

use super::ScrollPosition;
use crate::domain::foundation::Percentage;

const STYLE_OPEN: &str = "<span id=\"style\">";
const POSITION_OPEN: &str = "<span id=\"position-percentage\">";
const CONTENT_OPEN: &str = "<div id=\"content\">";
const SPAN_CLOSE: &str = "</span>";
const CONTENT_CLOSE: &str = "</div>\n</div>";

/// Errors raised when reading an envelope on the receiving side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("Envelope is missing the {0} section")]
    MissingSection(&'static str),

    #[error("Invalid position percentage: {0}")]
    InvalidPosition(String),
}

/// One update as produced by the editor side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEnvelope {
    pub style: String,
    pub position: ScrollPosition,
    pub content: String,
}

impl SnapshotEnvelope {
    pub fn new(
        style: impl Into<String>,
        position: ScrollPosition,
        content: impl Into<String>,
    ) -> Self {
        Self {
            style: style.into(),
            position,
            content: content.into(),
        }
    }

    /// Serializes into the HTML fragment sent over the wire.
    ///
    /// Style and content are passed through verbatim.
    pub fn to_wire(&self) -> String {
        format!(
            "<div>\n  {STYLE_OPEN}{}{SPAN_CLOSE}\n  {POSITION_OPEN}{}{SPAN_CLOSE}\n  {CONTENT_OPEN}{}{CONTENT_CLOSE}",
            self.style, self.position, self.content
        )
    }

    /// Reads a wire payload back, as a viewer would.
    pub fn parse(payload: &str) -> Result<ReceivedSnapshot, EnvelopeError> {
        let style = section(payload, STYLE_OPEN, SPAN_CLOSE).ok_or(EnvelopeError::MissingSection("style"))?;
        let raw_position = section(payload, POSITION_OPEN, SPAN_CLOSE)
            .ok_or(EnvelopeError::MissingSection("position-percentage"))?;
        let position = raw_position
            .trim()
            .parse::<i64>()
            .map_err(|_| EnvelopeError::InvalidPosition(raw_position.to_string()))?;

        let content_start = payload
            .find(CONTENT_OPEN)
            .ok_or(EnvelopeError::MissingSection("content"))?
            + CONTENT_OPEN.len();
        // Content is arbitrary HTML and may nest divs, so close from the end.
        let content_end = payload
            .rfind(CONTENT_CLOSE)
            .filter(|end| *end >= content_start)
            .ok_or(EnvelopeError::MissingSection("content"))?;

        Ok(ReceivedSnapshot {
            style: style.to_string(),
            position: ScrollPosition::from_raw(position),
            content: payload[content_start..content_end].to_string(),
        })
    }
}

/// An envelope as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedSnapshot {
    pub style: String,
    pub position: ScrollPosition,
    pub content: String,
}

impl ReceivedSnapshot {
    /// Scroll target for display, clamped into `[0, 100]`.
    pub fn scroll_target(&self) -> Percentage {
        self.position.clamped()
    }
}

fn section<'a>(payload: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = payload.find(open)? + open.len();
    let len = payload[start..].find(close)?;
    Some(&payload[start..start + len])
}
