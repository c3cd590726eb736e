//! Preview Relay - live markdown preview over WebSocket
//!
//! A broadcast relay fans rendered HTML snapshots from one producer out to
//! every connected viewer. The producer side renders an editor buffer on
//! save and on an idle timer.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
