use std::collections::BTreeMap;

use crate::error::Result;
use crate::rules::{Finding, Severity};

use serde_json::{json, Value};

/// Render findings as SARIF 2.1.0.
///
/// One rule entry per finding type, sorted by type. Each rule links to its
/// CWE page and is tagged with the CWE and language of its first finding.
pub fn render(findings: &[Finding], project: &str) -> Result<String> {
    let mut first_by_kind: BTreeMap<&str, &Finding> = BTreeMap::new();
    for finding in findings {
        first_by_kind.entry(finding.kind.as_str()).or_insert(finding);
    }

    let rules: Vec<Value> = first_by_kind
        .values()
        .map(|f| {
            let mut rule = json!({
                "id": f.kind,
                "name": f.kind,
                "shortDescription": { "text": f.message },
                "defaultConfiguration": {
                    "level": severity_to_sarif_level(f.severity),
                },
                "properties": {
                    "tags": ["security", f.cwe, f.language.tag()],
                },
            });
            if let Some(uri) = cwe_url(&f.cwe) {
                rule["helpUri"] = json!(uri);
            }
            rule
        })
        .collect();

    let results: Vec<Value> = findings
        .iter()
        .map(|f| {
            let mut region = json!({ "startLine": f.line });
            if let Some(column) = f.column {
                region["startColumn"] = json!(column);
            }
            json!({
                "ruleId": f.kind,
                "level": severity_to_sarif_level(f.severity),
                "message": { "text": format!("{}: {}", f.message, f.code_snippet) },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": f.file },
                        "region": region,
                    },
                }],
                "partialFingerprints": { "securescanId/v1": f.id },
            })
        })
        .collect();

    let sarif = json!({
        "$schema": "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "securescan",
                    "version": env!("CARGO_PKG_VERSION"),
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                },
            },
            "results": results,
            "automationDetails": {
                "id": format!("securescan/{}", project),
            },
        }],
    });

    let output = serde_json::to_string_pretty(&sarif)?;
    Ok(output)
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low | Severity::Info => "note",
    }
}

/// `CWE-89` -> MITRE definition page.
fn cwe_url(cwe: &str) -> Option<String> {
    if cwe.is_empty() {
        return None;
    }
    let id = cwe.strip_prefix("CWE-").unwrap_or(cwe);
    Some(format!("https://cwe.mitre.org/data/definitions/{id}.html"))
}
