//! WebSocket upgrade handler for relay connections.
//!
//! Every connection, producer or viewer, goes through the same lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Join the hub (receiving the join snapshot, if any)
//! 3. Relay every inbound text frame to all members until disconnect
//! 4. Leave the hub
//!
//! Plain `GET /` without an upgrade serves the viewer page.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};

use crate::domain::relay::ViewerConnection;

use super::{hub::RelayHub, viewer::ViewerHandle};

/// Viewer page served to browsers.
pub const VIEWER_PAGE: &str = include_str!("../../../assets/viewer.html");

/// State required for relay connections.
#[derive(Clone)]
pub struct RelayState {
    /// Hub shared by every connection of this server.
    pub hub: Arc<RelayHub>,
}

impl RelayState {
    pub fn new(hub: Arc<RelayHub>) -> Self {
        Self { hub }
    }
}

/// Route: `GET /`
///
/// Upgrades to a relay connection when the client asks for a WebSocket,
/// otherwise returns the viewer page.
pub async fn relay_handler(
    ws: Option<WebSocketUpgrade>,
    State(state): State<RelayState>,
) -> Response {
    match ws {
        Some(ws) => ws.on_upgrade(move |socket| handle_socket(socket, state)),
        None => Html(VIEWER_PAGE).into_response(),
    }
}

/// Handle an established relay connection.
///
/// Runs for the lifetime of the connection. The writer drains the
/// connection's outbox into the socket; the reader relays inbound frames.
/// Whichever finishes first ends the connection.
async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (mut sender, mut receiver) = socket.split();

    let (viewer, mut outbox) = ViewerHandle::channel();
    let connection_id = viewer.id();
    state.hub.join(viewer).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = outbox.recv().await {
            if let Err(e) = sender.send(Message::Text(payload)).await {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Send error, closing connection: {}",
                    e
                );
                return;
            }
        }
        // Outbox dropped by the hub: relay is shutting down.
        let _ = sender.close().await;
    });

    let hub = state.hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(payload)) => {
                    let report = hub.relay(payload).await;
                    tracing::debug!(
                        connection_id = %connection_id,
                        delivered = report.delivered,
                        failed = report.failed,
                        "Relayed snapshot"
                    );
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Received unsupported binary message"
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Handled by the protocol layer
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.leave(&connection_id).await;
}

/// Create axum router for the relay endpoint.
pub fn relay_router() -> axum::Router<RelayState> {
    use axum::routing::get;

    axum::Router::new().route("/", get(relay_handler))
}
