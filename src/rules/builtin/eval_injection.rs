use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

static EVAL_CALLEES: Lazy<HashMap<Language, HashSet<&'static str>>> = Lazy::new(|| {
    let ecmascript: HashSet<&str> = ["eval", "Function"].into_iter().collect();
    HashMap::from([
        (Language::JavaScript, ecmascript.clone()),
        (Language::TypeScript, ecmascript),
        (
            Language::Python,
            ["eval", "exec", "compile"].into_iter().collect(),
        ),
    ])
});

/// Eval Injection
///
/// Flags every call (or `new`) of a dynamic-code entry point. Literal
/// arguments still flag: the call itself is the risk.
pub(super) fn matches(parsed: &ParsedFile, language: Language) -> Vec<MatchSite> {
    let Some(callees) = EVAL_CALLEES.get(&language) else {
        return Vec::new();
    };

    parsed
        .calls
        .iter()
        .filter(|call| callees.contains(call.callee.as_str()))
        .map(|call| call.site.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::{lines, run};

    #[cfg(feature = "javascript")]
    #[test]
    fn flags_literal_and_variable_eval() {
        let code = "eval(\"2+2\");\neval(userInput);\n";
        let sites = run(matches, "a.js", code);
        assert_eq!(lines(&sites), vec![1, 2]);
        assert_eq!(sites[1].snippet, "eval(userInput)");
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn flags_function_constructor() {
        let sites = run(matches, "a.js", "const f = new Function('a', body);\nFunction(src)();\n");
        assert_eq!(lines(&sites), vec![1, 2]);
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn ignores_member_named_eval() {
        assert!(run(matches, "a.js", "sandbox.eval(code);").is_empty());
    }

    #[cfg(feature = "typescript")]
    #[test]
    fn flags_in_typescript() {
        let sites = run(matches, "a.ts", "const r: number = eval(expr as string);");
        assert_eq!(sites.len(), 1);
    }

    #[cfg(feature = "python")]
    #[test]
    fn flags_python_entry_points() {
        let code = "eval(expr)\nexec('print(1)')\ncompile(src, 'f', 'exec')\nre.compile(p)\n";
        assert_eq!(lines(&run(matches, "a.py", code)), vec![1, 2, 3]);
    }

    #[cfg(feature = "go")]
    #[test]
    fn go_has_no_eval_table() {
        let code = "package main\n\nfunc main() { eval(x) }\n";
        assert!(run(matches, "main.go", code).is_empty());
    }
}
