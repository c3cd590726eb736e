//! Pulldown-cmark based renderer adapter.
//!
//! Implements the `MarkdownRenderer` port with the pure Rust `pulldown-cmark`
//! parser. Output is an HTML body fragment; the stylesheet travels separately
//! in the envelope.

use async_trait::async_trait;
use pulldown_cmark::{html, Options, Parser};

use crate::ports::{MarkdownRenderer, RendererError};

/// Renderer using pulldown-cmark with GitHub-flavoured extensions.
#[derive(Debug, Clone, Copy)]
pub struct PulldownRenderer {
    options: Options,
}

impl PulldownRenderer {
    /// Create a renderer with tables, footnotes, strikethrough and task lists.
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }

    fn render_sync(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut body = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut body, parser);
        body
    }
}

impl Default for PulldownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarkdownRenderer for PulldownRenderer {
    async fn render(&self, markdown: &str) -> Result<String, RendererError> {
        Ok(self.render_sync(markdown))
    }
}
