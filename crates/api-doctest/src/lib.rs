//! api-doctest: API tests that write their own documentation
//!
//! Every step an API test performs (requests, responses, narrative text,
//! uploads, assertions that held) is recorded in execution order and
//! rendered into one human-readable report per test class.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   say_*    ┌─────────────┐  end   ┌────────────────┐
//! │   DocTest    │──────────►│ DocMachine  │───────►│ ReportRenderer │
//! │  (harness)   │           │ (items in   │        │ (HTML, JSON,   │
//! └──────┬───────┘           │  call order)│        │  recording)    │
//!        │ get/post/...      └──────┬──────┘        └───────┬────────┘
//!        ▼                          │ validate name         │ write_file
//! ┌──────────────┐           ┌──────▼──────────────────────▼─┐
//! │  ApiClient   │           │          ReportFiles          │
//! └──────────────┘           └───────────────────────────────┘
//! ```
//!
//! The HTTP client is a collaborator supplied by the caller through the
//! [`ApiClient`] trait; this crate never performs network I/O itself.

#![warn(missing_docs)]

pub mod config;
pub mod files;
pub mod http;
pub mod item;
pub mod json;
pub mod logging;
pub mod machine;
pub mod render;
mod result;
pub mod visibility;

pub use config::{DocTestConfig, RetryPolicy};
pub use doc_test::{DocTest, ReportSpec, NO_BODY};
pub use files::{NarratedFile, ReportFiles};
pub use http::{
    ApiClient, ApiRequest, ApiResponse, Cookie, CookieJar, Exchange, HttpMethod, MemoryCookieJar,
    UploadFile,
};
pub use item::{
    DocItem, LinkItem, NamedValue, NamedValues, PreformattedItem, RequestItem, ResponseItem,
    SectionItem, TextItem, UploadItem, VerifyItem,
};
pub use json::JsonComparator;
pub use machine::{DocMachine, Fragment, MachineState, ReportSession};
pub use render::{
    CompositeRenderer, HtmlRenderer, JsonRenderer, RecordingRenderer, RenderedReport,
    ReportRenderer,
};
pub use result::{DocTestError, DocTestResult};
pub use visibility::{Visibility, VisibilityConfig, ALL_ELEMENTS};

/// Everything a doc test usually needs
pub mod prelude {
    pub use super::config::*;
    pub use super::doc_test::*;
    pub use super::files::*;
    pub use super::http::*;
    pub use super::item::*;
    pub use super::json::JsonComparator;
    pub use super::machine::{DocMachine, Fragment, MachineState, ReportSession};
    pub use super::render::*;
    pub use super::result::*;
    pub use super::visibility::*;
}
