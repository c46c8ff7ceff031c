use std::path::Path;

use super::builtin;
use super::{Detector, Finding, RuleMetadata, Severity};
use crate::ir::{Language, MatchSite};
use crate::parser::{Dialect, ParsedFile, SyntaxTree};

/// Signature shared by every structural matcher.
pub type Matcher = fn(&ParsedFile, Language) -> Vec<MatchSite>;

/// One syntax-tree rule. Pure data; the catalog is static.
pub struct StructuralRule {
    pub kind: &'static str,
    pub name: &'static str,
    pub severity: Severity,
    pub cwe: &'static str,
    pub message: &'static str,
    pub matcher: Matcher,
}

impl StructuralRule {
    pub fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            kind: self.kind.to_string(),
            name: self.name.to_string(),
            severity: self.severity,
            cwe: self.cwe.to_string(),
            message: self.message.to_string(),
            engine: "structural".to_string(),
        }
    }
}

/// Parses each file once and runs every structural rule against the
/// normalized result.
pub struct StructuralEngine {
    rules: &'static [StructuralRule],
    /// Parallel to `rules`.
    metadata: Vec<RuleMetadata>,
}

impl StructuralEngine {
    pub fn new() -> Self {
        let rules = builtin::catalog();
        Self {
            rules,
            metadata: rules.iter().map(StructuralRule::metadata).collect(),
        }
    }
}

impl Default for StructuralEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StructuralEngine {
    fn kind(&self) -> &str {
        "ast_engine"
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn cwe(&self) -> &str {
        ""
    }

    fn detect(&self, path: &Path, language: Language, content: &[u8]) -> Vec<Finding> {
        // Node text is sliced from this buffer, so it must be valid UTF-8.
        let text = String::from_utf8_lossy(content);
        let content = text.as_bytes();
        let Some(tree) = SyntaxTree::parse(language, Dialect::from_path(path), content) else {
            tracing::debug!(file = %path.display(), language = %language, "no syntax tree, skipping structural rules");
            return Vec::new();
        };
        if tree.has_errors() {
            tracing::debug!(file = %path.display(), "syntax errors, analyzing partial tree");
        }

        let parsed = tree.extract(content);
        drop(tree);

        let file = path.to_string_lossy();
        let mut findings = Vec::new();
        for (rule, meta) in self.rules.iter().zip(&self.metadata) {
            for site in (rule.matcher)(&parsed, language) {
                findings.push(Finding::at(meta, &file, language, site));
            }
        }
        findings
    }

    fn rules(&self) -> Vec<RuleMetadata> {
        self.metadata.clone()
    }
}
