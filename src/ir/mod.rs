//! Grammar-agnostic intermediate representation.
//!
//! Each language normalizer lowers its grammar's call, construction and
//! assignment shapes into the types below. Structural rules are written only
//! against this form, so they never see a grammar's node-type names.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Maximum snippet length (in characters) kept on a match site.
pub const SNIPPET_MAX: usize = 120;

/// Programming language of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Go,
}

impl Language {
    /// Every supported language, in tag order.
    pub const ALL: [Language; 4] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Go,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "tsx" => Some(Self::TypeScript),
            "py" => Some(Self::Python),
            "go" => Some(Self::Go),
            _ => None,
        }
    }

    /// Resolve a language from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            "python" | "py" => Some(Self::Python),
            "go" | "golang" => Some(Self::Go),
            _ => None,
        }
    }

    /// The lowercase tag used in findings and configuration.
    pub fn tag(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Go => "go",
        }
    }

    /// JavaScript and TypeScript share one normalizer and one set of tables.
    pub fn is_ecmascript(self) -> bool {
        matches!(self, Self::JavaScript | Self::TypeScript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Location and excerpt of a matched node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSite {
    /// 1-based line.
    pub line: usize,
    /// 1-based column (byte offset within the line).
    pub column: usize,
    pub snippet: String,
}

impl MatchSite {
    pub fn new(line: usize, column: usize, text: &str) -> Self {
        Self {
            line,
            column,
            snippet: truncate_snippet(text, SNIPPET_MAX),
        }
    }
}

/// Trim `text` and cut it to at most `max_chars` characters, appending `...`
/// when anything was dropped.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Coarse classification of an expression, shared by every language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Plain string, template without substitution, f-string without fields.
    StringLiteral,
    NumberLiteral,
    /// Template literal with `${}` or f-string with `{}` fields.
    Interpolated,
    /// Binary expression / operator (`+`, `%`, ...).
    Concatenation,
    /// Call to a string-formatting routine (`.format`, `fmt.Sprintf`).
    FormatCall,
    Call,
    /// Identifier, member/attribute/selector access, subscript, spread.
    Reference,
    /// Anything else: objects, arrays, lambdas, booleans, keywords.
    Other,
}

impl ValueShape {
    pub fn is_string_literal(self) -> bool {
        matches!(self, Self::StringLiteral)
    }

    /// A value that may vary at runtime. Literals and structural values
    /// (objects, arrays, lambdas) are never dynamic.
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            Self::Interpolated
                | Self::Concatenation
                | Self::FormatCall
                | Self::Call
                | Self::Reference
        )
    }

    /// A string assembled at runtime rather than written out literally.
    pub fn is_built_string(self) -> bool {
        matches!(
            self,
            Self::Interpolated | Self::Concatenation | Self::FormatCall
        )
    }
}

/// A classified expression: an argument or the right side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub shape: ValueShape,
    pub text: String,
    /// Keyword name for Python keyword arguments (`Loader=...`).
    pub keyword: Option<String>,
}

/// A call or `new` construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Callee source text with whitespace removed (`child_process.exec`).
    pub callee: String,
    /// Trailing member name when the callee is a member access (`exec`).
    pub property: Option<String>,
    /// `new Callee(...)`.
    pub construct: bool,
    pub args: Vec<Value>,
    /// Source text of the whole call.
    pub text: String,
    pub site: MatchSite,
}

impl CallSite {
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

/// A declaration or assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Source text of the left-hand side.
    pub target: String,
    /// Every member/subscript key along the left-hand access chain, quotes
    /// stripped (`a.b["c"] = x` yields `["c", "b"]`).
    pub target_keys: Vec<String>,
    /// Outermost member name on the left-hand side.
    pub property: Option<String>,
    /// Right-hand values; multi-value forms (`a, b := x, y`) are flattened.
    pub values: Vec<Value>,
    /// `+=` and friends.
    pub augmented: bool,
    pub site: MatchSite,
}
