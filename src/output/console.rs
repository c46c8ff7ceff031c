use crate::rules::policy::PolicyVerdict;
use crate::rules::{Finding, Severity};
use crate::scan::ScanResult;

/// Render a scan result for the terminal, most severe findings first.
pub fn render(result: &ScanResult, verdict: &PolicyVerdict) -> String {
    let mut output = String::new();
    let summary = &result.summary;

    output.push_str(&format!("\n  securescan: {}\n", result.project));
    output.push_str(&format!("  Files scanned: {}\n", summary.total_files));
    if result.truncated {
        output.push_str("  Scan cancelled: results are partial.\n");
    }

    let counts = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ]
    .iter()
    .map(|&s| format!("{s}: {}", summary.by_severity.get(s)))
    .collect::<Vec<_>>()
    .join(", ");
    output.push_str(&format!("  Findings: {} ({counts})\n", summary.total_vulnerabilities));

    if result.vulnerabilities.is_empty() {
        output.push_str("\n  No security findings detected.\n\n");
    } else {
        let mut sorted: Vec<&Finding> = result.vulnerabilities.iter().collect();
        sorted.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.file.cmp(&b.file))
                .then_with(|| a.line.cmp(&b.line))
        });

        output.push('\n');
        for finding in sorted {
            let severity_tag = match finding.severity {
                Severity::Critical => "[CRITICAL]",
                Severity::High => "[HIGH]    ",
                Severity::Medium => "[MEDIUM]  ",
                Severity::Low => "[LOW]     ",
                Severity::Info => "[INFO]    ",
            };
            output.push_str(&format!(
                "  {} {} {} ({})\n",
                severity_tag, finding.kind, finding.message, finding.cwe
            ));
            output.push_str(&format!("           at {}:{}\n", finding.file, finding.line));
            output.push_str(&format!("           {}\n\n", finding.code_snippet));
        }
    }

    // Verdict
    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {})\n\n",
        status,
        verdict
            .fail_threshold
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}
