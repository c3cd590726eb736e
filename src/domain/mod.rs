//! Domain layer containing the relay's core types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, percentage, validation errors)
//! - `preview` - Snapshot envelope and scroll position hint
//! - `relay` - Viewer connection abstraction and the connection registry

pub mod foundation;
pub mod preview;
pub mod relay;
