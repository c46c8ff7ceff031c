mod command_injection;
mod eval_injection;
mod hardcoded_secret;
mod insecure_deserialization;
mod path_traversal;
mod prototype_pollution;
mod sql_injection;
mod xss_dom;

use std::collections::HashMap;

use super::structural::StructuralRule;
use super::Severity;
use crate::ir::CallSite;

static RULES: [StructuralRule; 8] = [
    StructuralRule {
        kind: "eval_injection",
        name: "Eval Injection",
        severity: Severity::Critical,
        cwe: "CWE-95",
        message: "Dangerous eval/exec call allows arbitrary code execution",
        matcher: eval_injection::matches,
    },
    StructuralRule {
        kind: "command_injection",
        name: "Command Injection",
        severity: Severity::Critical,
        cwe: "CWE-78",
        message: "OS command execution with potentially unsanitized input",
        matcher: command_injection::matches,
    },
    StructuralRule {
        kind: "path_traversal",
        name: "Path Traversal",
        severity: Severity::High,
        cwe: "CWE-22",
        message: "File operation with dynamic path may allow directory traversal",
        matcher: path_traversal::matches,
    },
    StructuralRule {
        kind: "xss_dom",
        name: "DOM XSS",
        severity: Severity::High,
        cwe: "CWE-79",
        message: "DOM-based XSS: unsafe assignment to innerHTML/outerHTML",
        matcher: xss_dom::matches,
    },
    StructuralRule {
        kind: "sql_injection_ast",
        name: "SQL Injection",
        severity: Severity::High,
        cwe: "CWE-89",
        message: "SQL query constructed with string interpolation or concatenation",
        matcher: sql_injection::matches,
    },
    StructuralRule {
        kind: "hardcoded_secret_ast",
        name: "Hardcoded Credential",
        severity: Severity::Critical,
        cwe: "CWE-798",
        message: "Hardcoded credential detected in variable assignment",
        matcher: hardcoded_secret::matches,
    },
    StructuralRule {
        kind: "insecure_deserialization",
        name: "Insecure Deserialization",
        severity: Severity::High,
        cwe: "CWE-502",
        message: "Deserialization of untrusted data (pickle/yaml.load without SafeLoader)",
        matcher: insecure_deserialization::matches,
    },
    StructuralRule {
        kind: "prototype_pollution",
        name: "Prototype Pollution",
        severity: Severity::Medium,
        cwe: "CWE-1321",
        message: "Potential prototype pollution via __proto__ or constructor.prototype",
        matcher: prototype_pollution::matches,
    },
];

/// The structural rule catalog, in reporting order.
pub fn catalog() -> &'static [StructuralRule] {
    &RULES
}

/// Dispatch table from callee (or trailing member name) to the index of the
/// argument a rule inspects.
#[derive(Debug, Default)]
pub(crate) struct CallTable {
    callees: HashMap<&'static str, usize>,
    properties: HashMap<&'static str, usize>,
}

impl CallTable {
    pub(crate) fn callees(mut self, names: &[&'static str], arg: usize) -> Self {
        self.callees.extend(names.iter().map(|n| (*n, arg)));
        self
    }

    pub(crate) fn properties(mut self, names: &[&'static str], arg: usize) -> Self {
        self.properties.extend(names.iter().map(|n| (*n, arg)));
        self
    }

    /// Argument index for `call`, matching the full callee first and then
    /// the member name. `None` means the call is not in the table.
    pub(crate) fn argument_index(&self, call: &CallSite) -> Option<usize> {
        if let Some(&index) = self.callees.get(call.callee.as_str()) {
            return Some(index);
        }
        call.property
            .as_deref()
            .and_then(|p| self.properties.get(p).copied())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::ir::{Language, MatchSite};
    use crate::parser::{Dialect, SyntaxTree};
    use crate::rules::structural::Matcher;

    /// Parse `code` as `file` and run one matcher over it.
    pub(crate) fn run(matcher: Matcher, file: &str, code: &str) -> Vec<MatchSite> {
        let path = Path::new(file);
        let language = Language::from_path(path).expect("supported extension");
        let tree = SyntaxTree::parse(language, Dialect::from_path(path), code.as_bytes())
            .expect("grammar enabled");
        matcher(&tree.extract(code.as_bytes()), language)
    }

    pub(crate) fn lines(sites: &[MatchSite]) -> Vec<usize> {
        sites.iter().map(|s| s.line).collect()
    }
}
