//! Scroll position hint carried in every envelope.

use std::fmt;

use crate::domain::foundation::Percentage;

/// Estimated scroll position within the source document, in percent.
///
/// Not clamped: a cursor near the top of a document with a tall window yields
/// a negative value, and the bottom edge can overshoot 100. Receivers call
/// [`ScrollPosition::clamped`] before using it for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollPosition(i64);

impl ScrollPosition {
    /// Wraps an already computed percentage.
    pub fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Computes `round(100 * (current_line - visible_lines / 2) / total_lines)`.
    ///
    /// `visible_lines` is halved with integer division. An empty document
    /// yields 0.
    pub fn from_cursor(current_line: usize, visible_lines: usize, total_lines: usize) -> Self {
        if total_lines == 0 {
            return Self(0);
        }
        let offset = current_line as i64 - (visible_lines / 2) as i64;
        let percent = (100.0 * offset as f64 / total_lines as f64).round();
        Self(percent as i64)
    }

    /// Raw, possibly out-of-range value.
    pub fn raw(&self) -> i64 {
        self.0
    }

    /// Value clamped into `[0, 100]` for display.
    pub fn clamped(&self) -> Percentage {
        Percentage::saturating_from(self.0)
    }
}

impl fmt::Display for ScrollPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
