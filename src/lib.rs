//! securescan: multi-language static vulnerability scanner.
//!
//! Parses JavaScript, TypeScript, Python and Go with tree-sitter, runs
//! structural and line-oriented rules over every file under a directory on a
//! bounded worker pool, and reports findings as console text, JSON or SARIF.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use securescan::{scan, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let report = scan(Path::new("./my-service"), &options).unwrap();
//! println!(
//!     "Pass: {}, Findings: {}",
//!     report.verdict.pass,
//!     report.result.vulnerabilities.len()
//! );
//! ```

pub mod config;
pub mod error;
pub mod ir;
pub mod output;
pub mod parser;
pub mod rules;
pub mod scan;

use std::path::{Path, PathBuf};

use config::{Config, CONFIG_FILE_NAME};
use error::Result;
use ir::Language;
use output::OutputFormat;
use rules::policy::PolicyVerdict;
use rules::{RuleEngine, Severity};
use scan::{CancelToken, ScanResult, Scanner};

/// Options for a scan invocation. Set fields override the config file.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.securescan.toml` in scan dir).
    pub config_path: Option<PathBuf>,
    pub languages: Option<Vec<Language>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub min_severity: Option<Severity>,
    /// CLI override for fail_on threshold.
    pub fail_on_override: Option<Severity>,
    pub cancel: Option<CancelToken>,
}

/// Complete scan report.
#[derive(Debug)]
pub struct ScanReport {
    pub result: ScanResult,
    pub verdict: PolicyVerdict,
}

/// Run a complete scan: validate the root, load config, walk and analyze,
/// evaluate policy.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<ScanReport> {
    scan::validate_root(path)?;

    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| path.join(CONFIG_FILE_NAME));
    let mut config = Config::load(&config_path)?;

    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = Some(fail_on);
    }

    let mut settings = config.scan_settings();
    if options.languages.is_some() {
        settings.languages = options.languages.clone();
    }
    if options.exclude_dirs.is_some() {
        settings.exclude_dirs = options.exclude_dirs.clone();
    }
    if options.concurrency.is_some() {
        settings.concurrency = options.concurrency;
    }
    if options.min_severity.is_some() {
        settings.min_severity = options.min_severity;
    }

    let scanner = Scanner::new(RuleEngine::new());
    let result = scanner.scan(path, &settings, options.cancel.as_ref())?;
    let verdict = config.policy.evaluate(&result.vulnerabilities);

    Ok(ScanReport { result, verdict })
}

/// Render a scan report in the specified format.
pub fn render_report(report: &ScanReport, format: OutputFormat) -> Result<String> {
    output::render(&report.result, &report.verdict, format)
}
