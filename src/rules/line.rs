use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Detector, Finding, RuleMetadata, Severity};
use crate::ir::{Language, MatchSite};

static SECRET_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(api[_-]?key|password|secret|token)\s*[:=]\s*['"][A-Za-z0-9_\-]{16,}['"]"#)
        .unwrap()
});

static SQL_CONCAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)select\s+.+\s+from\s+.+\s*(\+|%s|\{)").unwrap());

static INNER_HTML_WRITE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)innerHTML\s*=").unwrap());

/// A single-regex rule evaluated line by line.
pub struct LineRule {
    meta: RuleMetadata,
    pattern: &'static Lazy<Regex>,
}

/// The line rules, in reporting order.
pub fn all_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(LineRule::new(
            "hardcoded_secret",
            "Hardcoded Secret",
            Severity::Critical,
            "CWE-798",
            "Hardcoded secret detected",
            &SECRET_ASSIGNMENT,
        )),
        Box::new(LineRule::new(
            "sql_injection",
            "SQL Injection",
            Severity::High,
            "CWE-89",
            "Possible SQL injection via string concatenation",
            &SQL_CONCAT,
        )),
        Box::new(LineRule::new(
            "xss",
            "Cross-Site Scripting",
            Severity::High,
            "CWE-79",
            "Potential XSS: unescaped HTML assignment",
            &INNER_HTML_WRITE,
        )),
    ]
}

impl LineRule {
    fn new(
        kind: &str,
        name: &str,
        severity: Severity,
        cwe: &str,
        message: &str,
        pattern: &'static Lazy<Regex>,
    ) -> Self {
        Self {
            meta: RuleMetadata {
                kind: kind.to_string(),
                name: name.to_string(),
                severity,
                cwe: cwe.to_string(),
                message: message.to_string(),
                engine: "line".to_string(),
            },
            pattern,
        }
    }
}

impl Detector for LineRule {
    fn kind(&self) -> &str {
        &self.meta.kind
    }

    fn severity(&self) -> Severity {
        self.meta.severity
    }

    fn cwe(&self) -> &str {
        &self.meta.cwe
    }

    fn detect(&self, path: &Path, language: Language, content: &[u8]) -> Vec<Finding> {
        let file = path.to_string_lossy();
        let text = String::from_utf8_lossy(content);

        text.lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                let m = self.pattern.find(line)?;
                Some(Finding::at(
                    &self.meta,
                    &file,
                    language,
                    MatchSite::new(idx + 1, m.start() + 1, line),
                ))
            })
            .collect()
    }

    fn rules(&self) -> Vec<RuleMetadata> {
        vec![self.meta.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(kind: &str, content: &str) -> Vec<Finding> {
        all_detectors()
            .into_iter()
            .find(|d| d.kind() == kind)
            .unwrap()
            .detect(Path::new("src/app.js"), Language::JavaScript, content.as_bytes())
    }

    #[test]
    fn detects_long_secret_assignment() {
        let findings = run("hardcoded_secret", "  const API_KEY = \"abcdefghijklmnop1234\";\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 1);
        assert_eq!(findings[0].column, Some(9));
        assert_eq!(findings[0].code_snippet, "const API_KEY = \"abcdefghijklmnop1234\";");
    }

    #[test]
    fn ignores_short_secret() {
        assert!(run("hardcoded_secret", "password = 'short'").is_empty());
    }

    #[test]
    fn detects_sql_concatenation() {
        let findings = run(
            "sql_injection",
            "ok();\nq = \"SELECT * FROM users WHERE id = \" + id;\n",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn one_finding_per_line() {
        let findings = run("xss", "a.innerHTML = x; b.innerHTML = y;\r\nc.innerHTML=z\n");
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[1].line, 2);
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let mut content = b"el.innerHTML = x;\n".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        content.extend_from_slice(b"el.innerHTML = y;\n");
        let findings = all_detectors()
            .into_iter()
            .find(|d| d.kind() == "xss")
            .unwrap()
            .detect(Path::new("a.js"), Language::JavaScript, &content);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[1].line, 3);
    }

    #[test]
    fn findings_carry_the_rule_metadata() {
        for detector in all_detectors() {
            let meta = &detector.rules()[0];
            assert_eq!(detector.kind(), meta.kind);
            assert_eq!(detector.cwe(), meta.cwe);
            assert_eq!(meta.engine, "line");
        }
        let findings = run("xss", "el.innerHTML = x;\n");
        assert_eq!(findings[0].message, "Potential XSS: unescaped HTML assignment");
        assert_eq!(findings[0].cwe, "CWE-79");
    }
}
