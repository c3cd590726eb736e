//! WebSocket adapters for the preview relay.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   envelope    ┌──────────────────────────────┐
//! │ ProducerClient   │ ────────────► │ RelayServer (axum, GET /)    │
//! │ (tungstenite)    │ ◄── echo ──── │   handler ─► RelayHub        │
//! └──────────────────┘               └──────────────────────────────┘
//!                                          │ fan-out (same payload)
//!                                          ▼
//!                                 viewer-a  viewer-b  viewer-c
//! ```
//!
//! # Components
//!
//! - [`hub`] - Registry membership and last-payload cache behind one lock
//! - [`viewer`] - Per-connection outbox handle registered in the hub
//! - [`handler`] - Axum WebSocket upgrade handler and viewer page
//! - [`server`] - Listening endpoint lifecycle
//! - [`producer`] - Client link used by the editor side

pub mod handler;
pub mod hub;
pub mod producer;
pub mod server;
pub mod viewer;

pub use handler::{relay_handler, relay_router, RelayState, VIEWER_PAGE};
pub use hub::RelayHub;
pub use producer::{ProducerClient, ProducerError};
pub use server::{RelayError, RelayServer};
pub use viewer::ViewerHandle;
