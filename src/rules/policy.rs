use serde::{Deserialize, Serialize};

use super::{Finding, Severity};

/// Policy verdict: the pass/fail decision over the reported findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_findings: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Option<Severity>,
}

/// Policy configuration loaded from `.securescan.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity that fails the scan. Unset never fails.
    #[serde(default)]
    pub fail_on: Option<Severity>,
}

impl Policy {
    pub fn failing_on(severity: Severity) -> Self {
        Self {
            fail_on: Some(severity),
        }
    }

    /// Evaluate findings against this policy and produce a verdict.
    pub fn evaluate(&self, findings: &[Finding]) -> PolicyVerdict {
        let highest = findings.iter().map(|f| f.severity).max();
        let failed = match self.fail_on {
            Some(threshold) => findings.iter().any(|f| f.severity >= threshold),
            None => false,
        };

        PolicyVerdict {
            pass: !failed,
            total_findings: findings.len(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Language, MatchSite};
    use crate::rules::RuleMetadata;

    fn make_finding(severity: Severity) -> Finding {
        let meta = RuleMetadata {
            kind: "test_rule".into(),
            name: "Test".into(),
            severity,
            cwe: "CWE-0".into(),
            message: "test".into(),
            engine: "line".into(),
        };
        Finding::at(&meta, "x.js", Language::JavaScript, MatchSite::new(1, 1, "x"))
    }

    #[test]
    fn default_policy_never_fails() {
        let verdict = Policy::default().evaluate(&[make_finding(Severity::Critical)]);
        assert!(verdict.pass);
        assert_eq!(verdict.highest_severity, Some(Severity::Critical));
    }

    #[test]
    fn fails_at_threshold() {
        let policy = Policy::failing_on(Severity::High);
        assert!(!policy.evaluate(&[make_finding(Severity::High)]).pass);
        assert!(!policy.evaluate(&[make_finding(Severity::Critical)]).pass);
    }

    #[test]
    fn passes_below_threshold() {
        let policy = Policy::failing_on(Severity::High);
        let verdict = policy.evaluate(&[make_finding(Severity::Medium), make_finding(Severity::Low)]);
        assert!(verdict.pass);
        assert_eq!(verdict.total_findings, 2);
        assert_eq!(verdict.fail_threshold, Some(Severity::High));
    }

    #[test]
    fn empty_findings_pass() {
        let verdict = Policy::failing_on(Severity::Info).evaluate(&[]);
        assert!(verdict.pass);
        assert_eq!(verdict.highest_severity, None);
    }
}
