//! Result and error types for api-doctest.

use thiserror::Error;

/// Result type for api-doctest operations
pub type DocTestResult<T> = Result<T, DocTestError>;

/// Errors that can occur while recording or rendering a report
#[derive(Debug, Error)]
pub enum DocTestError {
    /// Operation called in the wrong lifecycle state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Report name is empty or otherwise unusable
    #[error("Invalid report name: {message}")]
    InvalidReportName {
        /// Error message
        message: String,
    },

    /// Report name already used in this run
    #[error("The file name {name} already exists. Please choose a new one!")]
    DuplicateReportName {
        /// Offending name
        name: String,
    },

    /// Narrated assertion did not hold
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Report file stayed locked for every retry attempt
    #[error("Writing {path} failed after {attempts} attempts: {message}")]
    WriteRetriesExhausted {
        /// Destination path
        path: String,
        /// Attempts made
        attempts: u32,
        /// Last I/O error
        message: String,
    },

    /// Value could not be turned into narration
    #[error("Serialization failed: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// HTTP client collaborator reported a failure
    #[error("Client error: {message}")]
    Client {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocTestError {
    /// Shorthand for a sequencing error
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Shorthand for an assertion failure showing both sides
    pub(crate) fn mismatch(
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::AssertionFailed {
            message: format!("expected {expected}, got {actual}"),
        }
    }

    /// Whether this error is a lifecycle sequencing bug
    #[must_use]
    pub const fn is_sequencing(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Whether this error is a report naming problem
    #[must_use]
    pub const fn is_naming(&self) -> bool {
        matches!(
            self,
            Self::InvalidReportName { .. } | Self::DuplicateReportName { .. }
        )
    }

    /// Whether this error is a failed assertion
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
