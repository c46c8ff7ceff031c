use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ir::Language;
use crate::rules::{Finding, Severity};

/// Outcome of scanning one file. Produced by a worker, consumed by the
/// aggregator.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub language: Language,
    /// Newline count plus one.
    pub lines: usize,
    /// Every finding, before severity filtering.
    pub findings: Vec<Finding>,
    /// Set when the file could not be read; such files are not counted.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn record(&mut self, severity: Severity) {
        *self.slot(severity) += 1;
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }

    fn slot(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
            Severity::Info => &mut self.info,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_files: usize,
    pub total_vulnerabilities: usize,
    pub by_severity: SeverityCounts,
}

/// The finalized result of one directory scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: String,
    /// RFC 3339, UTC, whole seconds.
    pub timestamp: String,
    /// Base name of the scanned directory.
    pub project: String,
    pub summary: ScanSummary,
    /// Findings at or above the minimum severity, in arrival order.
    pub vulnerabilities: Vec<Finding>,
    #[serde(skip)]
    pub files: Vec<FileResult>,
    /// The scan was cancelled before the walk completed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl ScanResult {
    /// Findings sorted by (file, line, type, id); stable across runs and
    /// worker counts.
    pub fn canonical_findings(&self) -> Vec<Finding> {
        let mut findings = self.vulnerabilities.clone();
        findings.sort_by(|a, b| {
            (&a.file, a.line, &a.kind, &a.id).cmp(&(&b.file, b.line, &b.kind, &b.id))
        });
        findings
    }
}

/// Folds worker output into a [`ScanResult`].
pub(crate) struct Aggregate {
    min_severity: Severity,
    files: Vec<FileResult>,
    findings: Vec<Finding>,
    counts: SeverityCounts,
}

impl Aggregate {
    pub(crate) fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            files: Vec::new(),
            findings: Vec::new(),
            counts: SeverityCounts::default(),
        }
    }

    pub(crate) fn add(&mut self, result: FileResult) {
        if result.error.is_some() {
            return;
        }
        for finding in &result.findings {
            if finding.severity >= self.min_severity {
                self.counts.record(finding.severity);
                self.findings.push(finding.clone());
            }
        }
        self.files.push(result);
    }

    pub(crate) fn finish(self, project: String, truncated: bool) -> ScanResult {
        ScanResult {
            scan_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            project,
            summary: ScanSummary {
                total_files: self.files.len(),
                total_vulnerabilities: self.findings.len(),
                by_severity: self.counts,
            },
            vulnerabilities: self.findings,
            files: self.files,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MatchSite;
    use crate::rules::RuleMetadata;
    use pretty_assertions::assert_eq;

    fn finding(file: &str, line: usize, severity: Severity) -> Finding {
        let meta = RuleMetadata {
            kind: "test_rule".into(),
            name: "Test".into(),
            severity,
            cwe: "CWE-0".into(),
            message: "m".into(),
            engine: "line".into(),
        };
        Finding::at(&meta, file, Language::Python, MatchSite::new(line, 1, "x"))
    }

    fn file(path: &str, findings: Vec<Finding>, error: Option<&str>) -> FileResult {
        FileResult {
            path: PathBuf::from(path),
            language: Language::Python,
            lines: 1,
            findings,
            error: error.map(Into::into),
        }
    }

    #[test]
    fn filters_by_min_severity_and_counts() {
        let mut agg = Aggregate::new(Severity::Medium);
        agg.add(file(
            "a.py",
            vec![
                finding("a.py", 1, Severity::Critical),
                finding("a.py", 2, Severity::Low),
                finding("a.py", 3, Severity::Medium),
            ],
            None,
        ));
        let result = agg.finish("proj".into(), false);

        assert_eq!(result.summary.total_files, 1);
        assert_eq!(result.summary.total_vulnerabilities, 2);
        assert_eq!(
            result.summary.by_severity,
            SeverityCounts {
                critical: 1,
                medium: 1,
                ..Default::default()
            }
        );
        // The file keeps everything it found.
        assert_eq!(result.files[0].findings.len(), 3);
    }

    #[test]
    fn error_results_are_excluded() {
        let mut agg = Aggregate::new(Severity::Info);
        agg.add(file("ok.py", vec![], None));
        agg.add(file("gone.py", vec![finding("gone.py", 1, Severity::High)], Some("denied")));
        let result = agg.finish("proj".into(), false);
        assert_eq!(result.summary.total_files, 1);
        assert_eq!(result.summary.total_vulnerabilities, 0);
    }

    #[test]
    fn json_omits_files_and_untruncated_flag() {
        let result = Aggregate::new(Severity::Info).finish("proj".into(), false);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("files").is_none());
        assert!(json.get("truncated").is_none());
        assert_eq!(json["summary"]["by_severity"]["critical"], 0);
        assert_eq!(json["project"], "proj");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));

        let truncated = Aggregate::new(Severity::Info).finish("proj".into(), true);
        let json = serde_json::to_value(&truncated).unwrap();
        assert_eq!(json["truncated"], true);
    }

    #[test]
    fn canonical_order_is_by_file_then_line() {
        let mut agg = Aggregate::new(Severity::Info);
        agg.add(file("b.py", vec![finding("b.py", 1, Severity::High)], None));
        agg.add(file(
            "a.py",
            vec![finding("a.py", 9, Severity::High), finding("a.py", 2, Severity::High)],
            None,
        ));
        let result = agg.finish("proj".into(), false);
        let order: Vec<(String, usize)> = result
            .canonical_findings()
            .into_iter()
            .map(|f| (f.file, f.line))
            .collect();
        assert_eq!(
            order,
            vec![("a.py".into(), 2), ("a.py".into(), 9), ("b.py".into(), 1)]
        );
    }

    #[test]
    fn counts_sum_to_total() {
        let mut counts = SeverityCounts::default();
        for s in [Severity::Info, Severity::High, Severity::High] {
            counts.record(s);
        }
        assert_eq!(counts.get(Severity::High), 2);
        assert_eq!(counts.total(), 3);
    }
}
