//! Report file naming and persistence.
//!
//! Every report lands in one output directory as `<name><extension>`.
//! Names are claimed when a report begins; a second claim of the same
//! name during one run is a configuration bug and fails before any bytes
//! are written.
//!
//! Claims live in one process-wide registry keyed by the canonical output
//! directory, so every handle writing to the same directory sees the same
//! names. Other processes writing there are not coordinated with.

use crate::config::{DocTestConfig, RetryPolicy};
use crate::render::INDEX_NAME;
use crate::result::{DocTestError, DocTestResult};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, warn};

/// Report names claimed in this process, per canonical output directory
static CLAIMED: OnceLock<Mutex<HashMap<PathBuf, HashSet<String>>>> = OnceLock::new();

fn claimed() -> MutexGuard<'static, HashMap<PathBuf, HashSet<String>>> {
    CLAIMED
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// File content prepared for upload narration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarratedFile {
    /// UTF-8 text with line breaks replaced by the break marker
    pub content_as_text: String,
    /// Length of the file in bytes
    pub size_bytes: u64,
}

/// Names, reads and writes report files
#[derive(Debug, Clone)]
pub struct ReportFiles {
    output_dir: PathBuf,
    extension: String,
    line_break_marker: String,
    retry: RetryPolicy,
}

impl ReportFiles {
    /// Create a handle for the configured output directory
    #[must_use]
    pub fn new(config: &DocTestConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            extension: config.extension.clone(),
            line_break_marker: config.line_break_marker.clone(),
            retry: config.write_retry,
        }
    }

    /// Output directory
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Report file extension, including the dot
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Marker that replaces line breaks in narrated file content
    #[must_use]
    pub fn line_break_marker(&self) -> &str {
        &self.line_break_marker
    }

    /// Full path of the report called `name`
    #[must_use]
    pub fn complete_file_name(&self, name: &str) -> PathBuf {
        self.complete_file_name_with(name, &self.extension)
    }

    /// Full path of `name` with an explicit extension
    #[must_use]
    pub fn complete_file_name_with(&self, name: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{name}{extension}"))
    }

    /// Whether `name` was claimed for this output directory in this run
    #[must_use]
    pub fn is_file_name_taken(&self, name: &str) -> bool {
        claimed()
            .get(&self.registry_key())
            .is_some_and(|names| names.contains(name))
    }

    /// Reject empty, reserved and already used names, then claim `name`
    ///
    /// Creates the output directory so the claim is keyed by its canonical
    /// path.
    pub fn validate_file_name(&self, name: &str) -> DocTestResult<()> {
        if name.trim().is_empty() {
            return Err(DocTestError::InvalidReportName {
                message: "The file name can not be empty.".to_string(),
            });
        }
        if name.contains(['/', '\\']) {
            return Err(DocTestError::InvalidReportName {
                message: format!("The file name {name} must not contain path separators."),
            });
        }
        if name.eq_ignore_ascii_case(INDEX_NAME) {
            return Err(DocTestError::InvalidReportName {
                message: format!("The file name {name} is reserved for the report index."),
            });
        }

        fs::create_dir_all(&self.output_dir)?;
        let key = self.registry_key();
        let mut registry = claimed();
        let names = registry.entry(key).or_default();
        if !names.insert(name.to_string()) {
            return Err(DocTestError::DuplicateReportName {
                name: name.to_string(),
            });
        }
        debug!(name, dir = %self.output_dir.display(), "claimed report name");
        Ok(())
    }

    fn registry_key(&self) -> PathBuf {
        fs::canonicalize(&self.output_dir).unwrap_or_else(|_| self.output_dir.clone())
    }

    /// Write `content` to `path`, creating parent directories first
    ///
    /// Content goes to a hidden sibling file which is then renamed over the
    /// destination. A locked destination is retried per the configured
    /// [`RetryPolicy`].
    pub fn write_file(&self, path: &Path, content: &str) -> DocTestResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_with_retry(path, content, self.retry, replace_file)?;
        debug!(path = %path.display(), bytes = content.len(), "report written");
        Ok(())
    }

    /// Read a file for upload narration
    ///
    /// `\r\n` and `\n` each become one break marker. A lone `\r` is not a
    /// line break here and stays in the text.
    pub fn read_file(&self, path: &Path) -> DocTestResult<NarratedFile> {
        let bytes = fs::read(path)?;
        let size_bytes = bytes.len() as u64;
        let text = String::from_utf8_lossy(&bytes);
        let content_as_text = text
            .replace("\r\n", "\n")
            .replace('\n', &self.line_break_marker);
        Ok(NarratedFile {
            content_as_text,
            size_bytes,
        })
    }

    /// Visible files in the output directory, sorted by name
    pub fn list_reports(&self) -> DocTestResult<Vec<String>> {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

fn replace_file(path: &Path, content: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&staging, content)?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    Ok(())
}

/// Whether an error means another process holds the destination
fn is_contention(err: &io::Error) -> bool {
    // 32 and 33 are ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION on Windows
    err.kind() == io::ErrorKind::WouldBlock
        || (cfg!(windows) && matches!(err.raw_os_error(), Some(32 | 33)))
}

fn write_with_retry<W>(
    path: &Path,
    content: &str,
    policy: RetryPolicy,
    mut write: W,
) -> DocTestResult<()>
where
    W: FnMut(&Path, &str) -> io::Result<()>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match write(path, content) {
            Ok(()) => return Ok(()),
            Err(e) if is_contention(&e) && attempt < attempts => {
                warn!(
                    path = %path.display(),
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "report file locked, retrying"
                );
                std::thread::sleep(policy.delay());
                attempt += 1;
            }
            Err(e) if is_contention(&e) => {
                return Err(DocTestError::WriteRetriesExhausted {
                    path: path.display().to_string(),
                    attempts,
                    message: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
}
