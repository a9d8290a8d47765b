//! Renderer boundary and the built-in renderers.
//!
//! A [`ReportRenderer`] receives the finished, ordered item list of one
//! report together with its name and is solely responsible for producing
//! the artifact. The doc machine calls it exactly once per report.

mod html;
mod json;

pub use html::{HtmlRenderer, INDEX_NAME};
pub use json::{JsonRenderer, JsonReport, JSON_EXTENSION};

use crate::item::DocItem;
use crate::result::DocTestResult;
use std::sync::{Arc, Mutex, PoisonError};

/// Turns a finished report into an artifact
pub trait ReportRenderer: Send {
    /// Render `items` as the report called `report_name`
    fn render(&self, items: &[DocItem], report_name: &str) -> DocTestResult<()>;
}

/// One report captured by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Report name
    pub name: String,
    /// Items in render order
    pub items: Vec<DocItem>,
}

/// Keeps every rendered report in memory
///
/// Clones share the same store, so a test can hand one clone to the
/// machine and inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    reports: Arc<Mutex<Vec<RenderedReport>>>,
}

impl RecordingRenderer {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report rendered so far
    #[must_use]
    pub fn reports(&self) -> Vec<RenderedReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent report
    #[must_use]
    pub fn last(&self) -> Option<RenderedReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of render calls
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ReportRenderer for RecordingRenderer {
    fn render(&self, items: &[DocItem], report_name: &str) -> DocTestResult<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RenderedReport {
                name: report_name.to_string(),
                items: items.to_vec(),
            });
        Ok(())
    }
}

/// Renders the same report through several renderers in order
#[derive(Default)]
pub struct CompositeRenderer {
    renderers: Vec<Box<dyn ReportRenderer>>,
}

impl std::fmt::Debug for CompositeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRenderer")
            .field("renderer_count", &self.renderers.len())
            .finish()
    }
}

impl CompositeRenderer {
    /// Create an empty composite
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a renderer
    #[must_use]
    pub fn with(mut self, renderer: impl ReportRenderer + 'static) -> Self {
        self.renderers.push(Box::new(renderer));
        self
    }
}

impl ReportRenderer for CompositeRenderer {
    fn render(&self, items: &[DocItem], report_name: &str) -> DocTestResult<()> {
        for renderer in &self.renderers {
            renderer.render(items, report_name)?;
        }
        Ok(())
    }
}

/// Escape HTML special characters
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_renderer_shares_store() {
        let recorder = RecordingRenderer::new();
        let handle = recorder.clone();
        recorder.render(&[DocItem::text("a")], "First").unwrap();
        assert_eq!(handle.render_count(), 1);
        let last = handle.last().unwrap();
        assert_eq!(last.name, "First");
        assert_eq!(last.items, vec![DocItem::text("a")]);
    }

    #[test]
    fn test_composite_renders_each() {
        let a = RecordingRenderer::new();
        let b = RecordingRenderer::new();
        let composite = CompositeRenderer::new().with(a.clone()).with(b.clone());
        composite.render(&[], "Empty").unwrap();
        assert_eq!(a.render_count(), 1);
        assert_eq!(b.render_count(), 1);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("<p>"), "&lt;p&gt;");
        assert_eq!(escape_html("\"q\""), "&quot;q&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
        assert_eq!(escape_html("plain text"), "plain text");
    }
}
