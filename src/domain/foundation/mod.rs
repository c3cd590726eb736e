//! Foundation module - Shared domain primitives.
//!
//! Contains the identifier and value object types that form the
//! vocabulary of the preview relay.

mod ids;
mod percentage;

pub use ids::ConnectionId;
pub use percentage::Percentage;
