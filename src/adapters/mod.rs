//! Adapters - Implementations of port interfaces and transports.
//!
//! - `websocket` - Relay server, hub, and producer client
//! - `markdown` - pulldown-cmark renderer
//! - `browser` - System browser launcher
//! - `document` - File document source and save watcher

pub mod browser;
pub mod document;
pub mod markdown;
pub mod websocket;
