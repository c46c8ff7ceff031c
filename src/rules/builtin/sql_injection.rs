use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::CallTable;
use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

const NODE_QUERY: &[&str] = &["query", "execute", "raw", "prepare"];

static QUERY_TABLES: Lazy<HashMap<Language, CallTable>> = Lazy::new(|| {
    HashMap::from([
        (Language::JavaScript, CallTable::default().properties(NODE_QUERY, 0)),
        (Language::TypeScript, CallTable::default().properties(NODE_QUERY, 0)),
        (
            Language::Python,
            CallTable::default().properties(&["execute", "executemany"], 0),
        ),
        (
            Language::Go,
            CallTable::default()
                .properties(&["Query", "Exec", "QueryRow"], 0)
                .properties(&["QueryContext", "ExecContext", "QueryRowContext"], 1),
        ),
    ])
});

/// SQL Injection (structural)
///
/// Flags query-method calls whose query argument is assembled at runtime:
/// concatenation, interpolation or a formatting call.
pub(super) fn matches(parsed: &ParsedFile, language: Language) -> Vec<MatchSite> {
    let Some(table) = QUERY_TABLES.get(&language) else {
        return Vec::new();
    };

    parsed
        .calls
        .iter()
        .filter(|call| !call.construct && call.property.is_some())
        .filter(|call| {
            table
                .argument_index(call)
                .and_then(|i| call.arg(i))
                .is_some_and(|arg| arg.shape.is_built_string())
        })
        .map(|call| call.site.clone())
        .collect()
}
