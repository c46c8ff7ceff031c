use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

const PROTOTYPE_KEYS: &[&str] = &["__proto__", "constructor"];

/// Prototype Pollution
///
/// Flags JS/TS assignments whose target chain writes through `__proto__`
/// or `constructor`, in dot or string-bracket form. Reads never flag.
pub(super) fn matches(parsed: &ParsedFile, language: Language) -> Vec<MatchSite> {
    if !language.is_ecmascript() {
        return Vec::new();
    }

    parsed
        .assignments
        .iter()
        .filter(|a| {
            a.target_keys
                .iter()
                .any(|k| PROTOTYPE_KEYS.contains(&k.as_str()))
        })
        .map(|a| a.site.clone())
        .collect()
}
