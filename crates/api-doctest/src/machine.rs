//! The doc machine: ordered accumulation of doc items for one report.
//!
//! ```text
//!            begin_doc_test            end_doc_test           prepare_doc_test
//!   Idle ────────────────────► Collecting ──────────► Ended ─────────────────► Idle
//!                               │    ▲
//!                               └────┘ say_* (append only)
//! ```
//!
//! Test bodies interleave narrative, requests and assertions freely; the
//! machine is a single mutable accumulator so the render step sees exactly
//! that temporal order. Calls outside the expected state are sequencing
//! errors and fail immediately.

use crate::files::ReportFiles;
use crate::http::{ApiRequest, ApiResponse};
use crate::item::{DocItem, RequestItem, ResponseItem, UploadItem};
use crate::json::JsonComparator;
use crate::render::ReportRenderer;
use crate::result::{DocTestError, DocTestResult};
use crate::visibility::Visibility;
use serde::Serialize;
use tracing::{debug, info};

/// Placeholder replaced by fragments in [`DocMachine::say_with`]
pub const PLACEHOLDER: &str = "{}";

/// Lifecycle state of a [`DocMachine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// No report open
    Idle,
    /// Report open, items being appended
    Collecting,
    /// Report rendered, waiting for reset
    Ended,
}

/// The in-progress report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSession {
    /// Report name, also the output file stem
    pub report_name: String,
    /// Leading text of the report
    pub introduction: String,
    /// Items in call order
    pub items: Vec<DocItem>,
}

/// One positional argument of a narrated template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Inserted as is
    Literal(String),
    /// Pretty-printed JSON of a value
    Json(String),
}

impl Fragment {
    /// Literal text fragment
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Pretty JSON fragment of `value`
    pub fn json<T: Serialize + ?Sized>(value: &T) -> DocTestResult<Self> {
        JsonComparator::new().to_json(value, true).map(Self::Json)
    }

    /// Rendered text of the fragment
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Json(text) => text,
        }
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

/// Substitute each `{}` in `template` with the fragment at the same position
pub fn fill_template(template: &str, fragments: &[Fragment]) -> DocTestResult<String> {
    let pieces: Vec<&str> = template.split(PLACEHOLDER).collect();
    let placeholders = pieces.len() - 1;
    if placeholders != fragments.len() {
        return Err(DocTestError::Serialization {
            message: format!(
                "template has {placeholders} placeholders but {} fragments were given",
                fragments.len()
            ),
        });
    }

    let mut text = String::with_capacity(template.len());
    for (i, piece) in pieces.iter().enumerate() {
        text.push_str(piece);
        if let Some(fragment) = fragments.get(i) {
            text.push_str(fragment.as_str());
        }
    }
    Ok(text)
}

/// Records the doc items of one report at a time
pub struct DocMachine {
    renderer: Box<dyn ReportRenderer>,
    files: ReportFiles,
    json: JsonComparator,
    state: MachineState,
    session: Option<ReportSession>,
}

impl std::fmt::Debug for DocMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocMachine")
            .field("state", &self.state)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl DocMachine {
    /// Create an idle machine
    #[must_use]
    pub fn new(renderer: impl ReportRenderer + 'static, files: ReportFiles) -> Self {
        Self::with_boxed_renderer(Box::new(renderer), files)
    }

    /// Create an idle machine from an already boxed renderer
    #[must_use]
    pub fn with_boxed_renderer(renderer: Box<dyn ReportRenderer>, files: ReportFiles) -> Self {
        Self {
            renderer,
            files,
            json: JsonComparator::new(),
            state: MachineState::Idle,
            session: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> MachineState {
        self.state
    }

    /// Open session, if collecting
    #[must_use]
    pub fn session(&self) -> Option<&ReportSession> {
        self.session.as_ref()
    }

    /// Items recorded so far in the open session
    #[must_use]
    pub fn items(&self) -> &[DocItem] {
        self.session
            .as_ref()
            .map_or(&[][..], |s| s.items.as_slice())
    }

    /// File namer used for report names
    #[must_use]
    pub const fn files(&self) -> &ReportFiles {
        &self.files
    }

    /// Open a report: `Idle → Collecting`
    ///
    /// Fails when another report is open, when the previous one was not
    /// reset, or when the name is empty or already used in this run. A
    /// non-empty introduction becomes the first item.
    pub fn begin_doc_test(&mut self, report_name: &str, introduction: &str) -> DocTestResult<()> {
        match self.state {
            MachineState::Idle => {}
            MachineState::Collecting => {
                let open = self
                    .session
                    .as_ref()
                    .map_or("<unknown>", |s| s.report_name.as_str());
                return Err(DocTestError::invalid_state(format!(
                    "cannot begin {report_name}: report {open} is still open"
                )));
            }
            MachineState::Ended => {
                return Err(DocTestError::invalid_state(format!(
                    "cannot begin {report_name}: prepare_doc_test was not called after the previous report"
                )));
            }
        }

        self.files.validate_file_name(report_name)?;

        let mut items = Vec::new();
        if !introduction.is_empty() {
            items.push(DocItem::text(introduction));
        }
        self.session = Some(ReportSession {
            report_name: report_name.to_string(),
            introduction: introduction.to_string(),
            items,
        });
        self.state = MachineState::Collecting;
        info!(report = report_name, "doc test started");
        Ok(())
    }

    /// Append narrative text
    pub fn say(&mut self, text: &str) -> DocTestResult<()> {
        self.append(DocItem::text(text))
    }

    /// Append narrative text assembled from a template and fragments
    ///
    /// Nothing is recorded when the placeholder count does not match.
    pub fn say_with(&mut self, template: &str, fragments: &[Fragment]) -> DocTestResult<()> {
        self.ensure_collecting("say_with")?;
        let text = fill_template(template, fragments)?;
        self.append(DocItem::text(text))
    }

    /// Append a section divider
    pub fn say_next_section_title(&mut self, title: &str) -> DocTestResult<()> {
        self.append(DocItem::section(title))
    }

    /// Append a verbatim block
    pub fn say_preformatted(&mut self, text: &str) -> DocTestResult<()> {
        self.append(DocItem::preformatted(text))
    }

    /// Append a request, showing only the visible headers and cookies
    pub fn say_request(
        &mut self,
        request: &ApiRequest,
        payload: Option<String>,
        headers: &Visibility,
        cookies: &Visibility,
    ) -> DocTestResult<()> {
        self.ensure_collecting("say_request")?;
        let is_json = payload
            .as_deref()
            .is_some_and(|p| self.json.is_json_valid(p));
        self.append(DocItem::Request(RequestItem {
            uri: request.uri.clone(),
            method: request.method,
            payload,
            is_json,
            headers: headers.filter(&request.headers),
            cookies: cookies.filter(&request.cookies),
        }))
    }

    /// Append a file upload, showing only the visible headers and cookies
    pub fn say_upload_request(
        &mut self,
        request: &ApiRequest,
        filename: &str,
        content_as_text: &str,
        size_bytes: u64,
        mime_type: &str,
        headers: &Visibility,
        cookies: &Visibility,
    ) -> DocTestResult<()> {
        self.append(DocItem::Upload(UploadItem {
            uri: request.uri.clone(),
            filename: filename.to_string(),
            content_as_text: content_as_text.to_string(),
            size_bytes,
            mime_type: mime_type.to_string(),
            headers: headers.filter(&request.headers),
            cookies: cookies.filter(&request.cookies),
        }))
    }

    /// Append a response, showing only the visible headers
    ///
    /// Response cookies are never recorded.
    pub fn say_response(
        &mut self,
        response: &ApiResponse,
        headers: &Visibility,
    ) -> DocTestResult<()> {
        self.ensure_collecting("say_response")?;
        let is_json = response
            .payload
            .as_deref()
            .is_some_and(|p| self.json.is_json_valid(p));
        self.append(DocItem::Response(ResponseItem {
            status_code: response.status_code,
            reason_phrase: response.reason_phrase.clone(),
            payload: response.payload.clone(),
            is_json,
            headers: headers.filter(&response.headers),
        }))
    }

    /// Append the narration of an assertion that already held
    pub fn say_verify(&mut self, message: &str) -> DocTestResult<()> {
        self.append(DocItem::verify(message))
    }

    /// Close the report and render it: `Collecting → Ended`
    ///
    /// The renderer is invoked exactly once. The machine is `Ended` even if
    /// rendering fails, so the failure surfaces once and the next report
    /// still needs [`prepare_doc_test`](Self::prepare_doc_test).
    pub fn end_doc_test(&mut self) -> DocTestResult<()> {
        self.ensure_collecting("end_doc_test")?;
        let session = self
            .session
            .take()
            .ok_or_else(|| DocTestError::invalid_state("collecting without a session"))?;
        self.state = MachineState::Ended;

        info!(
            report = %session.report_name,
            items = session.items.len(),
            "doc test finished, rendering"
        );
        self.renderer.render(&session.items, &session.report_name)
    }

    /// Reset after a finished report: `Ended → Idle`
    pub fn prepare_doc_test(&mut self) -> DocTestResult<()> {
        if self.state != MachineState::Ended {
            return Err(DocTestError::invalid_state(format!(
                "prepare_doc_test called while {:?}; it must follow end_doc_test",
                self.state
            )));
        }
        self.session = None;
        self.state = MachineState::Idle;
        debug!("doc machine reset");
        Ok(())
    }

    fn ensure_collecting(&self, operation: &str) -> DocTestResult<()> {
        if self.state == MachineState::Collecting {
            Ok(())
        } else {
            Err(DocTestError::invalid_state(format!(
                "{operation} called while {:?}; call begin_doc_test first",
                self.state
            )))
        }
    }

    fn append(&mut self, item: DocItem) -> DocTestResult<()> {
        self.ensure_collecting(item.kind())?;
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| DocTestError::invalid_state("collecting without a session"))?;
        debug!(kind = item.kind(), position = session.items.len(), "doc item recorded");
        session.items.push(item);
        Ok(())
    }
}
