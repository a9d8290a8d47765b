//! Report output configuration.

use crate::result::{DocTestError, DocTestResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`DocTestConfig::output_dir`]
pub const OUTPUT_DIR_ENV: &str = "DOCTEST_OUTPUT_DIR";

/// Environment variable overriding [`DocTestConfig::extension`]
pub const EXTENSION_ENV: &str = "DOCTEST_EXTENSION";

/// Bounded retry for writes that hit a locked destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 25,
            delay_ms: 200,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    /// Pause between attempts
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Where and how reports are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocTestConfig {
    /// Directory receiving one file per report
    pub output_dir: PathBuf,
    /// Extension appended to the report name, including the dot
    pub extension: String,
    /// Replacement for line breaks in narrated upload content
    pub line_break_marker: String,
    /// Retry behaviour for contended writes
    pub write_retry: RetryPolicy,
}

impl Default for DocTestConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("target/site/doctests"),
            extension: ".html".to_string(),
            line_break_marker: "<br/>".to_string(),
            write_retry: RetryPolicy::default(),
        }
    }
}

impl DocTestConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with environment overrides applied
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(OUTPUT_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(ext) = lookup(EXTENSION_ENV).filter(|v| !v.trim().is_empty()) {
            self.extension = normalize_extension(&ext);
        }
        self
    }

    /// Parse configuration from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> DocTestResult<Self> {
        let mut config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| DocTestError::Config {
            message: e.to_string(),
        })?;
        config.extension = normalize_extension(&config.extension);
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> DocTestResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Set output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set report file extension
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = normalize_extension(extension);
        self
    }

    /// Set line break marker
    #[must_use]
    pub fn with_line_break_marker(mut self, marker: impl Into<String>) -> Self {
        self.line_break_marker = marker.into();
        self
    }

    /// Set write retry policy
    #[must_use]
    pub const fn with_write_retry(mut self, policy: RetryPolicy) -> Self {
        self.write_retry = policy;
        self
    }
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{trimmed}")
    }
}
