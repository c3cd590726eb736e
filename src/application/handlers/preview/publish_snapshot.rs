//! PublishSnapshotHandler - renders the buffer and pushes one envelope.

use std::fmt;
use std::sync::Arc;

use crate::application::PreviewError;
use crate::domain::preview::{ScrollPosition, SnapshotEnvelope};
use crate::ports::{DocumentSource, MarkdownRenderer, SnapshotPublisher};

/// What caused a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTrigger {
    IdleTick,
    Save,
    Manual,
}

impl fmt::Display for PublishTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PublishTrigger::IdleTick => "idle_tick",
            PublishTrigger::Save => "save",
            PublishTrigger::Manual => "manual",
        };
        write!(f, "{}", s)
    }
}

/// Command to publish the current buffer.
#[derive(Debug, Clone)]
pub struct PublishSnapshotCommand {
    pub trigger: PublishTrigger,
}

/// Result of a publish attempt.
#[derive(Debug, Clone)]
pub struct PublishSnapshotResult {
    pub envelope: SnapshotEnvelope,
    /// Whether the publisher accepted the envelope.
    pub queued: bool,
}

/// Handler turning a buffer snapshot into a relayed envelope.
pub struct PublishSnapshotHandler {
    document: Arc<dyn DocumentSource>,
    renderer: Arc<dyn MarkdownRenderer>,
    publisher: Arc<dyn SnapshotPublisher>,
    style: String,
}

impl PublishSnapshotHandler {
    pub fn new(
        document: Arc<dyn DocumentSource>,
        renderer: Arc<dyn MarkdownRenderer>,
        publisher: Arc<dyn SnapshotPublisher>,
        style: impl Into<String>,
    ) -> Self {
        Self {
            document,
            renderer,
            publisher,
            style: style.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: PublishSnapshotCommand,
    ) -> Result<PublishSnapshotResult, PreviewError> {
        // 1. Reopen the link if it dropped since the last publish
        self.publisher.connect().await?;

        // 2. Capture buffer state
        let snapshot = self.document.snapshot().await?;

        // 3. Render
        let content = self.renderer.render(&snapshot.text).await?;

        // 4. Build envelope
        let position = ScrollPosition::from_cursor(
            snapshot.cursor_line,
            snapshot.visible_lines,
            snapshot.total_lines(),
        );
        let envelope = SnapshotEnvelope::new(self.style.clone(), position, content);

        // 5. Push
        let queued = self.publisher.publish(&envelope).await;
        tracing::debug!(
            trigger = %cmd.trigger,
            position = %envelope.position,
            bytes = envelope.content.len(),
            queued,
            "Published snapshot"
        );

        Ok(PublishSnapshotResult { envelope, queued })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        DocumentError, DocumentSnapshot, PublishError, RendererError,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockDocument {
        snapshot: Option<DocumentSnapshot>,
    }

    #[async_trait]
    impl DocumentSource for MockDocument {
        async fn snapshot(&self) -> Result<DocumentSnapshot, DocumentError> {
            self.snapshot
                .clone()
                .ok_or_else(|| DocumentError::Encoding("simulated".to_string()))
        }
    }

    struct UppercaseRenderer;

    #[async_trait]
    impl MarkdownRenderer for UppercaseRenderer {
        async fn render(&self, markdown: &str) -> Result<String, RendererError> {
            Ok(format!("<p>{}</p>", markdown.to_uppercase()))
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl MarkdownRenderer for FailingRenderer {
        async fn render(&self, _markdown: &str) -> Result<String, RendererError> {
            Err(RendererError::Failed("boom".to_string()))
        }
    }

    #[derive(Default)]
    struct MockPublisher {
        unreachable: bool,
        connects: Mutex<usize>,
        published: Mutex<Vec<SnapshotEnvelope>>,
    }

    #[async_trait]
    impl SnapshotPublisher for MockPublisher {
        async fn connect(&self) -> Result<(), PublishError> {
            *self.connects.lock().unwrap() += 1;
            if self.unreachable {
                return Err(PublishError::Unreachable {
                    url: "ws://test/".to_string(),
                    reason: "refused".to_string(),
                });
            }
            Ok(())
        }

        async fn publish(&self, envelope: &SnapshotEnvelope) -> bool {
            self.published.lock().unwrap().push(envelope.clone());
            true
        }

        async fn close(&self) {}
    }

    fn document(text: &str, cursor_line: usize, visible_lines: usize) -> Arc<MockDocument> {
        Arc::new(MockDocument {
            snapshot: Some(DocumentSnapshot::new(text, cursor_line, visible_lines)),
        })
    }

    fn command() -> PublishSnapshotCommand {
        PublishSnapshotCommand {
            trigger: PublishTrigger::Manual,
        }
    }

    #[tokio::test]
    async fn publishes_rendered_envelope_with_style_and_position() {
        let publisher = Arc::new(MockPublisher::default());
        let text = (1..=100).map(|i| format!("line {i}\n")).collect::<String>();
        let handler = PublishSnapshotHandler::new(
            document(&text, 50, 20),
            Arc::new(UppercaseRenderer),
            publisher.clone(),
            "theme.css",
        );

        let result = handler.handle(command()).await.unwrap();

        assert!(result.queued);
        assert_eq!(result.envelope.style, "theme.css");
        assert_eq!(result.envelope.position.raw(), 40);
        assert!(result.envelope.content.starts_with("<p>LINE 1"));
        assert_eq!(publisher.published.lock().unwrap().as_slice(), &[result.envelope]);
    }

    #[tokio::test]
    async fn connects_before_every_publish() {
        let publisher = Arc::new(MockPublisher::default());
        let handler = PublishSnapshotHandler::new(
            document("x", 1, 0),
            Arc::new(UppercaseRenderer),
            publisher.clone(),
            "s",
        );

        handler.handle(command()).await.unwrap();
        handler.handle(command()).await.unwrap();

        assert_eq!(*publisher.connects.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn unreachable_relay_is_reported_without_publishing() {
        let publisher = Arc::new(MockPublisher {
            unreachable: true,
            ..Default::default()
        });
        let handler = PublishSnapshotHandler::new(
            document("x", 1, 0),
            Arc::new(UppercaseRenderer),
            publisher.clone(),
            "s",
        );

        let result = handler.handle(command()).await;

        assert!(matches!(result, Err(PreviewError::Publish(_))));
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn document_failure_skips_update() {
        let publisher = Arc::new(MockPublisher::default());
        let handler = PublishSnapshotHandler::new(
            Arc::new(MockDocument { snapshot: None }),
            Arc::new(UppercaseRenderer),
            publisher.clone(),
            "s",
        );

        assert!(matches!(
            handler.handle(command()).await,
            Err(PreviewError::Document(_))
        ));
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn render_failure_skips_update() {
        let publisher = Arc::new(MockPublisher::default());
        let handler = PublishSnapshotHandler::new(
            document("x", 1, 0),
            Arc::new(FailingRenderer),
            publisher.clone(),
            "s",
        );

        assert!(matches!(
            handler.handle(command()).await,
            Err(PreviewError::Render(_))
        ));
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[test]
    fn trigger_displays_snake_case() {
        assert_eq!(PublishTrigger::IdleTick.to_string(), "idle_tick");
        assert_eq!(PublishTrigger::Save.to_string(), "save");
    }
}
