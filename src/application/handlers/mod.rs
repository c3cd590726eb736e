//! Application handlers.

pub mod preview;
