use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

const HTML_SINKS: &[&str] = &["innerHTML", "outerHTML"];

/// DOM XSS
///
/// Flags writes to `innerHTML`/`outerHTML` (plain or `+=`) from anything but
/// a string literal.
pub(super) fn matches(parsed: &ParsedFile, language: Language) -> Vec<MatchSite> {
    if !language.is_ecmascript() {
        return Vec::new();
    }

    parsed
        .assignments
        .iter()
        .filter(|a| {
            a.property
                .as_deref()
                .is_some_and(|p| HTML_SINKS.contains(&p))
        })
        .filter(|a| a.values.iter().any(|v| !v.shape.is_string_literal()))
        .map(|a| a.site.clone())
        .collect()
}
