use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ir::{Language, MatchSite};

/// A vulnerability reported by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier, see [`finding_id`].
    pub id: String,
    /// Rule type tag (e.g., "command_injection").
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub file: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, when the detector knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub code_snippet: String,
    pub message: String,
    pub cwe: String,
    pub language: Language,
}

impl Finding {
    /// Build a finding at `site`, deriving its id from (file, kind, line).
    pub fn at(
        meta: &RuleMetadata,
        file: &str,
        language: Language,
        site: MatchSite,
    ) -> Self {
        Self {
            id: finding_id(file, &meta.kind, site.line),
            kind: meta.kind.clone(),
            severity: meta.severity,
            file: file.to_string(),
            line: site.line,
            column: Some(site.column),
            code_snippet: site.snippet,
            message: meta.message.clone(),
            cwe: meta.cwe.clone(),
            language,
        }
    }
}

/// First 8 bytes of SHA-256 over `"{file}|{kind}|{line}"`, hex-encoded.
pub fn finding_id(file: &str, kind: &str, line: usize) -> String {
    let digest = Sha256::digest(format!("{file}|{kind}|{line}").as_bytes());
    hex::encode(&digest[..8])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Numeric rank, 1 (info) through 5 (critical).
    pub fn rank(self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Low => 2,
            Self::Medium => 3,
            Self::High => 4,
            Self::Critical => 5,
        }
    }

    /// Rank of a possibly unknown severity; unknown sorts below everything.
    pub fn rank_of(severity: Option<Self>) -> u8 {
        severity.map(Self::rank).unwrap_or(0)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Metadata about a rule, used for `list-rules` output and finding construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Type tag carried by findings.
    pub kind: String,
    pub name: String,
    pub severity: Severity,
    pub cwe: String,
    pub message: String,
    /// "structural" or "line".
    pub engine: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn id_is_sixteen_hex_chars() {
        let id = finding_id("src/app.js", "eval_injection", 3);
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn id_distinguishes_kind_and_line() {
        let base = finding_id("a.py", "command_injection", 1);
        assert_ne!(base, finding_id("a.py", "command_injection", 2));
        assert_ne!(base, finding_id("a.py", "eval_injection", 1));
        assert_ne!(base, finding_id("b.py", "command_injection", 1));
    }

    #[test]
    fn severity_order_is_total() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
        assert_eq!(Severity::rank_of(None), 0);
        assert!(Severity::rank_of(Some(Severity::Info)) > Severity::rank_of(None));
    }

    #[test]
    fn parses_severity_leniently() {
        assert_eq!(Severity::from_str_lenient("CRIT"), Some(Severity::Critical));
        assert_eq!(Severity::from_str_lenient(" medium "), Some(Severity::Medium));
        assert_eq!(Severity::from_str_lenient("bogus"), None);
    }

    #[test]
    fn finding_json_shape() {
        let meta = RuleMetadata {
            kind: "eval_injection".into(),
            name: "Eval Injection".into(),
            severity: Severity::Critical,
            cwe: "CWE-95".into(),
            message: "Dynamic code execution".into(),
            engine: "structural".into(),
        };
        let mut finding = Finding::at(
            &meta,
            "app.js",
            Language::JavaScript,
            MatchSite::new(2, 5, "eval(x)"),
        );
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["type"], "eval_injection");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["column"], 5);
        assert_eq!(json["language"], "javascript");

        finding.column = None;
        let json = serde_json::to_value(&finding).unwrap();
        assert!(json.get("column").is_none());
    }

    const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    proptest! {
        #[test]
        fn id_is_a_pure_function(file in "[a-z/._]{1,40}", kind in "[a-z_]{1,20}", line in 1usize..100_000) {
            prop_assert_eq!(finding_id(&file, &kind, line), finding_id(&file, &kind, line));
        }

        #[test]
        fn rank_agrees_with_ord(a in 0usize..5, b in 0usize..5) {
            let (x, y) = (ALL[a], ALL[b]);
            prop_assert_eq!(x.cmp(&y), x.rank().cmp(&y.rank()));
        }
    }
}
