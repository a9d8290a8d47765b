//! Machine-readable reports.

use super::ReportRenderer;
use crate::files::ReportFiles;
use crate::item::DocItem;
use crate::result::DocTestResult;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Extension of JSON reports
pub const JSON_EXTENSION: &str = ".json";

/// On-disk shape of a JSON report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonReport {
    /// Report name
    pub name: String,
    /// RFC 3339 generation time
    pub generated_at: String,
    /// Items in call order
    pub items: Vec<DocItem>,
}

/// Writes each report as `<name>.json`
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    files: ReportFiles,
}

impl JsonRenderer {
    /// Create a renderer writing through `files`
    #[must_use]
    pub const fn new(files: ReportFiles) -> Self {
        Self { files }
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, items: &[DocItem], report_name: &str) -> DocTestResult<()> {
        let report = JsonReport {
            name: report_name.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            items: items.to_vec(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        let path = self.files.complete_file_name_with(report_name, JSON_EXTENSION);
        self.files.write_file(&path, &json)?;
        info!(report = report_name, path = %path.display(), "JSON report written");
        Ok(())
    }
}
