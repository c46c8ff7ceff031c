pub mod go;
pub mod javascript;
pub mod python;

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::ir::{Assignment, CallSite, Language, MatchSite, Value};

/// Grammar variant within a language. `.tsx` needs the TSX grammar; `.jsx`
/// parses with the stock JavaScript grammar but is tracked for symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Standard,
    Jsx,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsx") || ext.eq_ignore_ascii_case("jsx") => {
                Self::Jsx
            }
            _ => Self::Standard,
        }
    }
}

// ── Grammar registry ─────────────────────────────────────────────

static GRAMMARS: Lazy<HashMap<(Language, Dialect), tree_sitter::Language>> = Lazy::new(|| {
    #[allow(unused_mut)]
    let mut grammars = HashMap::new();

    #[cfg(feature = "javascript")]
    {
        let js: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        grammars.insert((Language::JavaScript, Dialect::Standard), js.clone());
        grammars.insert((Language::JavaScript, Dialect::Jsx), js);
    }

    #[cfg(feature = "typescript")]
    {
        grammars.insert(
            (Language::TypeScript, Dialect::Standard),
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        );
        grammars.insert(
            (Language::TypeScript, Dialect::Jsx),
            tree_sitter_typescript::LANGUAGE_TSX.into(),
        );
    }

    #[cfg(feature = "python")]
    {
        let py: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        grammars.insert((Language::Python, Dialect::Standard), py.clone());
        grammars.insert((Language::Python, Dialect::Jsx), py);
    }

    #[cfg(feature = "go")]
    {
        let go: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        grammars.insert((Language::Go, Dialect::Standard), go.clone());
        grammars.insert((Language::Go, Dialect::Jsx), go);
    }

    grammars
});

/// Look up the grammar registered for a language. `None` means the language
/// is unsupported in this build.
pub fn grammar_for(language: Language, dialect: Dialect) -> Option<&'static tree_sitter::Language> {
    GRAMMARS.get(&(language, dialect))
}

// ── Parse engine ─────────────────────────────────────────────────

/// One parsed file. Dropping it releases the tree.
pub struct SyntaxTree {
    tree: tree_sitter::Tree,
    language: Language,
}

impl SyntaxTree {
    /// Parse `content`. Returns `None` when no grammar is registered or the
    /// parser produced no tree; trees with error nodes are still returned.
    pub fn parse(language: Language, dialect: Dialect, content: &[u8]) -> Option<Self> {
        let grammar = grammar_for(language, dialect)?;

        let mut parser = tree_sitter::Parser::new();
        if let Err(e) = parser.set_language(grammar) {
            tracing::debug!(language = %language, error = %e, "grammar rejected by parser");
            return None;
        }

        let tree = parser.parse(content, None)?;
        Some(Self { tree, language })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Normalize the whole tree into the intermediate form.
    pub fn extract(&self, source: &[u8]) -> ParsedFile {
        extract(self.root(), source, self.language)
    }
}

// ── Node capability ──────────────────────────────────────────────

/// The node operations the normalizers rely on.
pub trait SyntaxNode: Copy {
    fn kind(&self) -> &str;
    fn child_by_field(&self, name: &str) -> Option<Self>;
    fn named_child_count(&self) -> usize;
    fn named_child(&self, index: usize) -> Option<Self>;
    /// 1-based.
    fn start_line(&self) -> usize;
    /// 1-based, in bytes.
    fn start_column(&self) -> usize;
    fn text<'s>(&self, source: &'s [u8]) -> &'s str;

    fn named_child_nodes(&self) -> Vec<Self> {
        (0..self.named_child_count())
            .filter_map(|i| self.named_child(i))
            .collect()
    }
}

impl<'tree> SyntaxNode for tree_sitter::Node<'tree> {
    fn kind(&self) -> &str {
        tree_sitter::Node::kind(self)
    }

    fn child_by_field(&self, name: &str) -> Option<Self> {
        self.child_by_field_name(name)
    }

    fn named_child_count(&self) -> usize {
        tree_sitter::Node::named_child_count(self) as usize
    }

    fn named_child(&self, index: usize) -> Option<Self> {
        tree_sitter::Node::named_child(self, index as _)
    }

    fn start_line(&self) -> usize {
        self.start_position().row + 1
    }

    fn start_column(&self) -> usize {
        self.start_position().column + 1
    }

    fn text<'s>(&self, source: &'s [u8]) -> &'s str {
        self.utf8_text(source).unwrap_or("")
    }

    fn named_child_nodes(&self) -> Vec<Self> {
        let mut cursor = self.walk();
        tree_sitter::Node::named_children(self, &mut cursor).collect()
    }
}

// ── Normalization ────────────────────────────────────────────────

/// Everything the structural rules need from one file, in pre-order.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub calls: Vec<CallSite>,
    pub assignments: Vec<Assignment>,
}

/// Per-language lowering of grammar nodes into the intermediate form.
pub trait LanguageParser {
    /// A call or construction, if `node` is one.
    fn call_site<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<CallSite>;

    /// A declaration or assignment, if `node` is one.
    fn assignment<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<Assignment>;

    /// Classify an expression node.
    fn value<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Value;
}

/// Walk the tree rooted at `root` with the normalizer for `language`.
pub fn extract<N: SyntaxNode>(root: N, source: &[u8], language: Language) -> ParsedFile {
    match language {
        Language::JavaScript | Language::TypeScript => {
            walk(root, source, &javascript::JavaScriptParser)
        }
        Language::Python => walk(root, source, &python::PythonParser),
        Language::Go => walk(root, source, &go::GoParser),
    }
}

/// Pre-order traversal with an explicit stack, so nesting depth is bounded
/// only by heap.
fn walk<N: SyntaxNode, P: LanguageParser>(root: N, source: &[u8], parser: &P) -> ParsedFile {
    let mut parsed = ParsedFile::default();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(call) = parser.call_site(node, source) {
            parsed.calls.push(call);
        }
        if let Some(assignment) = parser.assignment(node, source) {
            parsed.assignments.push(assignment);
        }
        stack.extend(node.named_child_nodes().into_iter().rev());
    }

    parsed
}

// ── Shared helpers ───────────────────────────────────────────────

pub(crate) fn site<N: SyntaxNode>(node: N, source: &[u8]) -> MatchSite {
    MatchSite::new(node.start_line(), node.start_column(), node.text(source))
}

/// Source text with all whitespace removed (`a .\n b` -> `a.b`).
pub(crate) fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Strip one layer of matching quotes or backticks.
pub(crate) fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\'', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Named children minus comments, which tree-sitter reports as named extras.
pub(crate) fn operands<N: SyntaxNode>(node: N) -> Vec<N> {
    node.named_child_nodes()
        .into_iter()
        .filter(|child| child.kind() != "comment")
        .collect()
}

pub(crate) fn has_child_kind<N: SyntaxNode>(node: N, kind: &str) -> bool {
    node.named_child_nodes().iter().any(|c| c.kind() == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_follows_extension() {
        assert_eq!(Dialect::from_path(Path::new("view.tsx")), Dialect::Jsx);
        assert_eq!(Dialect::from_path(Path::new("view.JSX")), Dialect::Jsx);
        assert_eq!(Dialect::from_path(Path::new("main.ts")), Dialect::Standard);
    }

    #[test]
    fn unquote_strips_one_layer() {
        assert_eq!(unquote("\"__proto__\""), "__proto__");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("`t`"), "t");
        assert_eq!(unquote("key"), "key");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn compact_drops_whitespace() {
        assert_eq!(compact("child_process\n  .exec"), "child_process.exec");
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn registry_has_javascript() {
        assert!(grammar_for(Language::JavaScript, Dialect::Standard).is_some());
    }

    #[cfg(all(feature = "javascript", feature = "typescript", feature = "python", feature = "go"))]
    #[test]
    fn every_language_parses_once() {
        let samples = [
            (Language::JavaScript, "const a = 1;"),
            (Language::TypeScript, "const a: number = 1;"),
            (Language::Python, "a = 1"),
            (Language::Go, "package main\nfunc main() {}"),
        ];
        for (lang, code) in samples {
            let tree = SyntaxTree::parse(lang, Dialect::Standard, code.as_bytes())
                .unwrap_or_else(|| panic!("{lang} should parse"));
            assert_eq!(tree.language(), lang);
            assert!(!tree.has_errors(), "{lang} sample should be clean");
        }
    }

    #[cfg(feature = "typescript")]
    #[test]
    fn tsx_dialect_parses_jsx() {
        let code = "const el = <div>{name}</div>;";
        let tree = SyntaxTree::parse(Language::TypeScript, Dialect::Jsx, code.as_bytes()).unwrap();
        assert!(!tree.has_errors());
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn malformed_source_still_yields_a_tree() {
        let code = "const x = eval(userInput;\n function (";
        let tree = SyntaxTree::parse(Language::JavaScript, Dialect::Standard, code.as_bytes()).unwrap();
        assert!(tree.has_errors());
        let _ = tree.extract(code.as_bytes());
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn walk_is_preorder() {
        let code = "outer(inner(x)); last();";
        let tree = SyntaxTree::parse(Language::JavaScript, Dialect::Standard, code.as_bytes()).unwrap();
        let parsed = tree.extract(code.as_bytes());
        let callees: Vec<&str> = parsed.calls.iter().map(|c| c.callee.as_str()).collect();
        assert_eq!(callees, vec!["outer", "inner", "last"]);
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 2_000;
        let code = format!("f({}x{});", "[".repeat(depth), "]".repeat(depth));
        let tree = SyntaxTree::parse(Language::JavaScript, Dialect::Standard, code.as_bytes()).unwrap();
        let parsed = tree.extract(code.as_bytes());
        assert_eq!(parsed.calls.len(), 1);
    }
}
