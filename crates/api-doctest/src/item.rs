//! Doc items: one recorded, renderable step of a test's narrative.
//!
//! Items form a flat sequence. Order of insertion is the only structure;
//! [`SectionItem`] entries are soft dividers that renderers interpret.

use crate::http::HttpMethod;
use serde::{Deserialize, Serialize};

/// One header or cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedValue {
    /// Name as sent on the wire
    pub name: String,
    /// Value
    pub value: String,
}

impl NamedValue {
    /// Create a new pair
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Insertion-ordered name/value map used for headers and cookies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedValues(Vec<NamedValue>);

impl NamedValues {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.0.iter_mut().find(|e| e.name == name) {
            existing.value = value;
        } else {
            self.0.push(NamedValue { name, value });
        }
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Case-insensitive lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.value.as_str())
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, NamedValue> {
        self.0.iter()
    }

    /// Entry names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.name.as_str())
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NamedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<'a> IntoIterator for &'a NamedValues {
    type Item = &'a NamedValue;
    type IntoIter = std::slice::Iter<'a, NamedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Free narrative text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    /// Text to show
    pub text: String,
}

/// Section boundary marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionItem {
    /// Section title
    pub title: String,
}

/// Verbatim block, e.g. a pretty-printed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreformattedItem {
    /// Block content
    pub text: String,
}

/// One outgoing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestItem {
    /// Target URI
    pub uri: String,
    /// HTTP method
    pub method: HttpMethod,
    /// JSON body, if any
    pub payload: Option<String>,
    /// Whether `payload` is well-formed JSON
    pub is_json: bool,
    /// Visible request headers
    pub headers: NamedValues,
    /// Visible request cookies
    pub cookies: NamedValues,
}

/// One inbound result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseItem {
    /// HTTP status code
    pub status_code: u16,
    /// Reason phrase sent with the status
    pub reason_phrase: String,
    /// Body, if any
    pub payload: Option<String>,
    /// Whether `payload` is well-formed JSON
    pub is_json: bool,
    /// Visible response headers
    pub headers: NamedValues,
}

/// A file-transfer request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadItem {
    /// Target URI
    pub uri: String,
    /// Uploaded file name
    pub filename: String,
    /// File content as text with line breaks replaced by the break marker
    pub content_as_text: String,
    /// File length in bytes
    pub size_bytes: u64,
    /// MIME type of the file
    pub mime_type: String,
    /// Visible request headers
    pub headers: NamedValues,
    /// Visible request cookies
    pub cookies: NamedValues,
}

/// Narration of an assertion that already held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyItem {
    /// Assertion description, possibly followed by expected JSON
    pub message: String,
}

/// Link to another report; only produced for the report index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    /// Link target, relative to the output directory
    pub target: String,
    /// Displayed name
    pub name: String,
}

/// A single recorded step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocItem {
    /// Narrative text
    Text(TextItem),
    /// Section divider
    Section(SectionItem),
    /// Verbatim block
    Preformatted(PreformattedItem),
    /// HTTP request
    Request(RequestItem),
    /// HTTP response
    Response(ResponseItem),
    /// File upload request
    Upload(UploadItem),
    /// Assertion narration
    Verify(VerifyItem),
    /// Index link
    Link(LinkItem),
}

impl DocItem {
    /// Text item
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextItem { text: text.into() })
    }

    /// Section item
    #[must_use]
    pub fn section(title: impl Into<String>) -> Self {
        Self::Section(SectionItem {
            title: title.into(),
        })
    }

    /// Preformatted item
    #[must_use]
    pub fn preformatted(text: impl Into<String>) -> Self {
        Self::Preformatted(PreformattedItem { text: text.into() })
    }

    /// Verify item
    #[must_use]
    pub fn verify(message: impl Into<String>) -> Self {
        Self::Verify(VerifyItem {
            message: message.into(),
        })
    }

    /// Link item
    #[must_use]
    pub fn link(target: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Link(LinkItem {
            target: target.into(),
            name: name.into(),
        })
    }

    /// Short variant name, stable across releases
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Section(_) => "section",
            Self::Preformatted(_) => "preformatted",
            Self::Request(_) => "request",
            Self::Response(_) => "response",
            Self::Upload(_) => "upload",
            Self::Verify(_) => "verify",
            Self::Link(_) => "link",
        }
    }
}
