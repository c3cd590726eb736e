//! Relay server - owns the listening endpoint and the hub.
//!
//! The listener and the hub live and die together inside `RunningRelay`,
//! so the server never exists partially.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::config::{RelayConfig, ValidationError};

use super::handler::{relay_router, RelayState};
use super::hub::RelayHub;

/// Errors raised when starting the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid relay address: {0}")]
    InvalidAddress(#[from] ValidationError),

    #[error("Failed to bind relay on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

struct RunningRelay {
    local_addr: SocketAddr,
    hub: Arc<RelayHub>,
    shutdown_tx: oneshot::Sender<()>,
    serve_task: JoinHandle<()>,
}

/// At most one live listening endpoint per instance.
pub struct RelayServer {
    config: RelayConfig,
    running: Mutex<Option<RunningRelay>>,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            running: Mutex::new(None),
        }
    }

    /// Bind and start serving.
    ///
    /// Idempotent: when already running, returns the existing address.
    pub async fn start(&self) -> Result<SocketAddr, RelayError> {
        let mut running = self.running.lock().await;
        if let Some(relay) = running.as_ref() {
            tracing::debug!(addr = %relay.local_addr, "Relay already running");
            return Ok(relay.local_addr);
        }

        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RelayError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| RelayError::Bind { addr, source })?;

        let hub = Arc::new(RelayHub::new());
        let app = relay_router()
            .with_state(RelayState::new(hub.clone()))
            .layer(TraceLayer::new_for_http());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let serve_task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("Relay server stopped with error: {}", e);
            }
        });

        tracing::info!(addr = %local_addr, "Relay listening");
        *running = Some(RunningRelay {
            local_addr,
            hub,
            shutdown_tx,
            serve_task,
        });
        Ok(local_addr)
    }

    /// Drop every connection and stop listening.
    ///
    /// Idempotent: a no-op when not running.
    pub async fn shutdown(&self) {
        let Some(relay) = self.running.lock().await.take() else {
            return;
        };

        // Stop accepting first; the closed hub refuses any upgrade still in flight.
        let _ = relay.shutdown_tx.send(());
        let dropped = relay.hub.close_all().await;

        let mut serve_task = relay.serve_task;
        if tokio::time::timeout(self.config.shutdown_timeout(), &mut serve_task)
            .await
            .is_err()
        {
            tracing::warn!("Relay did not stop in time, aborting");
            serve_task.abort();
        }
        tracing::info!(addr = %relay.local_addr, dropped, "Relay stopped");
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Bound address while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.local_addr)
    }

    /// Hub of the running relay.
    pub async fn hub(&self) -> Option<Arc<RelayHub>> {
        self.running.lock().await.as_ref().map(|r| r.hub.clone())
    }

    /// Open connections, producer included. Zero when not running.
    pub async fn connection_count(&self) -> usize {
        match self.hub().await {
            Some(hub) => hub.connection_count().await,
            None => 0,
        }
    }
}
