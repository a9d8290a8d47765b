//! Header and cookie visibility.
//!
//! Tests opt in to the headers and cookies that should appear in the
//! report. Names match case-insensitively, order follows the actual map.

use crate::item::NamedValues;

/// Wildcard entry meaning "show everything"
pub const ALL_ELEMENTS: &str = "*";

/// Which names of a header or cookie map are shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Show every entry
    All,
    /// Show only the listed names; an empty list shows nothing
    Only(Vec<String>),
}

impl Default for Visibility {
    fn default() -> Self {
        Self::none()
    }
}

impl Visibility {
    /// Show nothing
    #[must_use]
    pub const fn none() -> Self {
        Self::Only(Vec::new())
    }

    /// Show everything
    #[must_use]
    pub const fn all() -> Self {
        Self::All
    }

    /// Show the given names; the single-element list `["*"]` means all
    #[must_use]
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() == 1 && names[0] == ALL_ELEMENTS {
            Self::All
        } else {
            Self::Only(names)
        }
    }

    /// Whether a single name is visible
    #[must_use]
    pub fn shows(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.iter().any(|n| n.eq_ignore_ascii_case(name)),
        }
    }

    /// Restrict `values` to visible names, keeping their order
    #[must_use]
    pub fn filter(&self, values: &NamedValues) -> NamedValues {
        match self {
            Self::All => values.clone(),
            Self::Only(names) if names.is_empty() => NamedValues::new(),
            Self::Only(_) => values
                .iter()
                .filter(|entry| self.shows(&entry.name))
                .map(|entry| (entry.name.clone(), entry.value.clone()))
                .collect(),
        }
    }
}

/// Per-test visibility for headers and cookies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityConfig {
    /// Headers shown on requests and responses
    pub headers: Visibility,
    /// Cookies shown on requests
    pub cookies: Visibility,
}

impl VisibilityConfig {
    /// Show nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show all headers and cookies
    #[must_use]
    pub const fn show_all() -> Self {
        Self {
            headers: Visibility::All,
            cookies: Visibility::All,
        }
    }

    /// Set header visibility
    #[must_use]
    pub fn with_headers(mut self, headers: Visibility) -> Self {
        self.headers = headers;
        self
    }

    /// Set cookie visibility
    #[must_use]
    pub fn with_cookies(mut self, cookies: Visibility) -> Self {
        self.cookies = cookies;
        self
    }
}
