use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

static UNSAFE_LOADERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "pickle.load",
        "pickle.loads",
        "cPickle.load",
        "cPickle.loads",
        "yaml.load",
        "marshal.loads",
        "shelve.open",
    ]
    .into_iter()
    .collect()
});

/// Loader names that make `yaml.load` acceptable. Checked against the whole
/// call text, so `Loader=yaml.SafeLoader` and positional forms both count.
const SAFE_YAML_LOADERS: &[&str] = &["SafeLoader", "FullLoader"];

/// Insecure Deserialization
///
/// Python only. Flags pickle/marshal/shelve loads, and `yaml.load` unless a
/// safe loader is named in the call.
pub(super) fn matches(parsed: &ParsedFile, language: Language) -> Vec<MatchSite> {
    if language != Language::Python {
        return Vec::new();
    }

    parsed
        .calls
        .iter()
        .filter(|call| UNSAFE_LOADERS.contains(call.callee.as_str()))
        .filter(|call| {
            call.callee != "yaml.load"
                || !SAFE_YAML_LOADERS.iter().any(|safe| call.text.contains(safe))
        })
        .map(|call| call.site.clone())
        .collect()
}
