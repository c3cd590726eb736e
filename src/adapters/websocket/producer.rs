//! Producer client - the editor side's link into the relay.
//!
//! Used only to send envelopes. The relay echoes broadcasts back to every
//! member including this link; that inbound traffic is drained and ignored.
//! There is no background reconnect: when the link drops, the next
//! `connect()` (driven by the next timer tick or save) opens a fresh one.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::domain::preview::SnapshotEnvelope;
use crate::ports::{PublishError, SnapshotPublisher};

const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Errors raised when opening the producer link.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Failed to connect to relay at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

struct ProducerLink {
    outgoing: mpsc::UnboundedSender<Message>,
    connected: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ProducerLink {
    fn is_alive(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.outgoing.is_closed()
    }
}

/// Outbound connection used to push envelopes into the relay.
pub struct ProducerClient {
    url: String,
    link: Mutex<Option<ProducerLink>>,
}

impl ProducerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            link: Mutex::new(None),
        }
    }

    /// Client for a relay listening on `addr`.
    pub fn for_relay(addr: SocketAddr) -> Self {
        Self::new(format!("ws://{addr}/"))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the link. No-op while already connected.
    pub async fn connect(&self) -> Result<(), ProducerError> {
        let mut link = self.link.lock().await;
        if link.as_ref().is_some_and(ProducerLink::is_alive) {
            return Ok(());
        }

        let (stream, _) =
            connect_async(self.url.as_str())
                .await
                .map_err(|source| ProducerError::Connect {
                    url: self.url.clone(),
                    source,
                })?;
        let (mut sink, mut inbound) = stream.split();
        let (outgoing, mut rx) = mpsc::unbounded_channel::<Message>();
        let connected = Arc::new(AtomicBool::new(true));

        let flag = connected.clone();
        let url = self.url.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    next = rx.recv() => match next {
                        Some(message) => {
                            let closing = matches!(message, Message::Close(_));
                            if let Err(e) = sink.send(message).await {
                                tracing::warn!(url = %url, "Producer send failed: {}", e);
                                break;
                            }
                            if closing {
                                break;
                            }
                        }
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                    incoming = inbound.next() => match incoming {
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::debug!(url = %url, "Relay closed producer link");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(url = %url, "Producer link error: {}", e);
                            break;
                        }
                    },
                }
            }
            flag.store(false, Ordering::SeqCst);
        });

        tracing::debug!(url = %self.url, "Producer connected");
        *link = Some(ProducerLink {
            outgoing,
            connected,
            task,
        });
        Ok(())
    }

    /// Queue one envelope for the relay.
    ///
    /// Never fails loudly: when the link is down the envelope is dropped with
    /// a warning. Returns whether it was queued.
    pub async fn send(&self, envelope: &SnapshotEnvelope) -> bool {
        let link = self.link.lock().await;
        match link.as_ref() {
            Some(link) if link.is_alive() => {
                if link.outgoing.send(Message::Text(envelope.to_wire())).is_err() {
                    tracing::warn!(url = %self.url, "Producer link closed, snapshot dropped");
                    return false;
                }
                true
            }
            _ => {
                tracing::warn!(url = %self.url, "Producer not connected, snapshot dropped");
                false
            }
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.link
            .lock()
            .await
            .as_ref()
            .is_some_and(ProducerLink::is_alive)
    }

    /// Close the link. Idempotent.
    pub async fn close(&self) {
        let Some(link) = self.link.lock().await.take() else {
            return;
        };
        let _ = link.outgoing.send(Message::Close(None));
        drop(link.outgoing);

        let mut task = link.task;
        if tokio::time::timeout(CLOSE_GRACE, &mut task).await.is_err() {
            task.abort();
        }
        tracing::debug!(url = %self.url, "Producer closed");
    }
}

#[async_trait]
impl SnapshotPublisher for ProducerClient {
    async fn connect(&self) -> Result<(), PublishError> {
        ProducerClient::connect(self)
            .await
            .map_err(|e| PublishError::Unreachable {
                url: self.url.clone(),
                reason: e.to_string(),
            })
    }

    async fn publish(&self, envelope: &SnapshotEnvelope) -> bool {
        self.send(envelope).await
    }

    async fn close(&self) {
        ProducerClient::close(self).await
    }
}
