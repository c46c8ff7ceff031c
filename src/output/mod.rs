pub mod console;
pub mod json;
pub mod sarif;

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::error::{Result, ScanError};
use crate::rules::policy::PolicyVerdict;
use crate::scan::ScanResult;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Sarif,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "sarif" => Some(Self::Sarif),
            _ => None,
        }
    }
}

/// Render a scan result into the specified format.
pub fn render(result: &ScanResult, verdict: &PolicyVerdict, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(result, verdict)),
        OutputFormat::Json => json::render(result),
        OutputFormat::Sarif => sarif::render(&result.vulnerabilities, &result.project),
    }
}

/// Write a rendered report to `path`.
pub fn write_to(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, rendered)
        .map_err(|e| ScanError::Output(format!("cannot write {}: {e}", path.display())))
}
