//! Relay core: viewer connections and the registry that tracks them.

mod connection;
mod registry;

pub use connection::{DeliveryError, ViewerConnection};
pub use registry::{ConnectionRegistry, DeliveryReport};
