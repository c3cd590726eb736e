//! PreviewSession - the editor integration's handle on one preview.
//!
//! Owns the relay server, the producer link, the idle timer and the save
//! hook for one edit session. Constructed explicitly and shared by `Arc`;
//! nothing here is process-global.
//!
//! # Lifecycle
//!
//! ```text
//! start_preview ──► relay up, producer linked, timer armed, hook attached
//! stop_preview  ──► timer disarmed, hook detached (relay and viewers stay)
//! cleanup       ──► stop_preview + producer closed + relay shut down
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::adapters::websocket::{ProducerClient, RelayServer};
use crate::config::PreviewConfig;
use crate::ports::{BrowserLauncher, DocumentSource, MarkdownRenderer};

use super::handlers::preview::{
    PublishSnapshotCommand, PublishSnapshotHandler, PublishSnapshotResult, PublishTrigger,
};
use super::PreviewError;

struct ProducerSlot {
    client: Arc<ProducerClient>,
    handler: Arc<PublishSnapshotHandler>,
}

/// One preview session.
pub struct PreviewSession {
    config: PreviewConfig,
    relay: Arc<RelayServer>,
    document: Arc<dyn DocumentSource>,
    renderer: Arc<dyn MarkdownRenderer>,
    browser: Arc<dyn BrowserLauncher>,
    producer: Mutex<Option<ProducerSlot>>,
    idle_timer: Mutex<Option<JoinHandle<()>>>,
    save_hook: AtomicBool,
}

impl PreviewSession {
    pub fn new(
        config: PreviewConfig,
        relay: Arc<RelayServer>,
        document: Arc<dyn DocumentSource>,
        renderer: Arc<dyn MarkdownRenderer>,
        browser: Arc<dyn BrowserLauncher>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            relay,
            document,
            renderer,
            browser,
            producer: Mutex::new(None),
            idle_timer: Mutex::new(None),
            save_hook: AtomicBool::new(false),
        })
    }

    /// Start the relay if needed, link the producer, arm the idle timer,
    /// attach the save hook and open the viewer page.
    ///
    /// Safe to call repeatedly: the relay, producer link and timer are
    /// each created at most once.
    pub async fn start_preview(self: &Arc<Self>) -> Result<SocketAddr, PreviewError> {
        let addr = self.relay.start().await?;
        self.link_producer(addr).await;
        self.arm_idle_timer().await;
        self.save_hook.store(true, Ordering::SeqCst);

        if self.config.open_browser {
            if let Err(e) = self.open_browser().await {
                tracing::warn!("Could not open viewer page: {}", e);
            }
        }
        Ok(addr)
    }

    /// Detach the save hook and disarm the idle timer.
    ///
    /// The relay and its viewers are left running. Idempotent.
    pub async fn stop_preview(&self) {
        self.save_hook.store(false, Ordering::SeqCst);
        if let Some(timer) = self.idle_timer.lock().await.take() {
            timer.abort();
            tracing::debug!("Idle timer disarmed");
        }
    }

    /// Stop triggers, close the producer and shut the relay down,
    /// dropping every viewer. Idempotent.
    pub async fn cleanup(&self) {
        self.stop_preview().await;
        if let Some(slot) = self.producer.lock().await.take() {
            slot.client.close().await;
        }
        self.relay.shutdown().await;
    }

    /// Open the viewer page. Independent of relay state.
    pub async fn open_browser(&self) -> Result<(), PreviewError> {
        let url = self.viewer_url().await;
        self.browser.open(&url)?;
        Ok(())
    }

    /// URL of the viewer page.
    pub async fn viewer_url(&self) -> String {
        if let Some(url) = &self.config.viewer_url {
            return url.clone();
        }
        match self.relay.local_addr().await {
            Some(addr) => format!("http://{addr}/"),
            None => {
                let relay = self.relay.config();
                format!("http://{}:{}/", relay.host, relay.port)
            }
        }
    }

    /// Editor save event. Publishes only while the hook is attached.
    ///
    /// Returns whether an envelope was queued.
    pub async fn notify_saved(&self) -> bool {
        if !self.save_hook.load(Ordering::SeqCst) {
            return false;
        }
        self.publish_logged(PublishTrigger::Save).await
    }

    /// Publish the current buffer once, regardless of triggers.
    pub async fn publish_now(&self) -> Result<PublishSnapshotResult, PreviewError> {
        self.publish(PublishTrigger::Manual).await
    }

    pub fn is_save_hook_attached(&self) -> bool {
        self.save_hook.load(Ordering::SeqCst)
    }

    pub async fn is_idle_timer_armed(&self) -> bool {
        self.idle_timer.lock().await.is_some()
    }

    pub fn relay(&self) -> &Arc<RelayServer> {
        &self.relay
    }

    async fn publish(&self, trigger: PublishTrigger) -> Result<PublishSnapshotResult, PreviewError> {
        let handler = match self.producer.lock().await.as_ref() {
            Some(slot) => slot.handler.clone(),
            None => return Err(PreviewError::NotStarted),
        };
        handler.handle(PublishSnapshotCommand { trigger }).await
    }

    async fn publish_logged(&self, trigger: PublishTrigger) -> bool {
        match self.publish(trigger).await {
            Ok(result) => result.queued,
            Err(e) => {
                tracing::warn!(trigger = %trigger, "Preview update skipped: {}", e);
                false
            }
        }
    }

    async fn link_producer(&self, addr: SocketAddr) {
        let mut slot = self.producer.lock().await;

        let expected = format!("ws://{addr}/");
        if slot.as_ref().map(|s| s.client.url()) != Some(expected.as_str()) {
            let client = Arc::new(ProducerClient::for_relay(addr));
            let handler = Arc::new(PublishSnapshotHandler::new(
                self.document.clone(),
                self.renderer.clone(),
                client.clone(),
                self.config.style.clone(),
            ));
            if let Some(stale) = slot.replace(ProducerSlot { client, handler }) {
                stale.client.close().await;
            }
        }

        if let Some(slot) = slot.as_ref() {
            if let Err(e) = slot.client.connect().await {
                tracing::warn!("Producer link not established yet: {}", e);
            }
        }
    }

    async fn arm_idle_timer(self: &Arc<Self>) {
        let mut timer = self.idle_timer.lock().await;
        if timer.is_some() {
            return;
        }

        let session: Weak<Self> = Arc::downgrade(self);
        let period = self.config.idle_interval();
        *timer = Some(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let Some(session) = session.upgrade() else {
                    break;
                };
                session.publish_logged(PublishTrigger::IdleTick).await;
            }
        }));
        tracing::debug!(period_ms = period.as_millis() as u64, "Idle timer armed");
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        if let Some(timer) = self.idle_timer.get_mut().take() {
            timer.abort();
        }
    }
}
