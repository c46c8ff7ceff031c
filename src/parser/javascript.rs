use super::{compact, has_child_kind, operands, site, unquote, LanguageParser, SyntaxNode};
use crate::ir::{Assignment, CallSite, Value, ValueShape};

/// Normalizer shared by the JavaScript, TypeScript and TSX grammars.
pub struct JavaScriptParser;

/// Expression wrappers that do not change what a value is.
const TRANSPARENT: &[&str] = &[
    "parenthesized_expression",
    "await_expression",
    "as_expression",
    "non_null_expression",
    "satisfies_expression",
];

const FORMAT_CALLEES: &[&str] = &["util.format"];

impl LanguageParser for JavaScriptParser {
    fn call_site<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<CallSite> {
        let (callee, construct) = match node.kind() {
            "call_expression" => (node.child_by_field("function")?, false),
            "new_expression" => (node.child_by_field("constructor")?, true),
            _ => return None,
        };

        let args = match node.child_by_field("arguments") {
            Some(list) if list.kind() == "arguments" => operands(list)
                .into_iter()
                .map(|arg| self.value(arg, source))
                .collect(),
            // Tagged template: the template itself is the only argument.
            Some(template) => vec![self.value(template, source)],
            None => Vec::new(),
        };

        Some(CallSite {
            callee: compact(callee.text(source)),
            property: member_property(callee, source),
            construct,
            args,
            text: node.text(source).to_string(),
            site: site(node, source),
        })
    }

    fn assignment<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<Assignment> {
        match node.kind() {
            kind @ ("assignment_expression" | "augmented_assignment_expression") => {
                let left = node.child_by_field("left")?;
                let right = node.child_by_field("right")?;
                Some(Assignment {
                    target: left.text(source).to_string(),
                    target_keys: access_keys(left, source),
                    property: member_property(left, source),
                    values: vec![self.value(right, source)],
                    augmented: kind == "augmented_assignment_expression",
                    site: site(node, source),
                })
            }
            "variable_declarator" => {
                let name = node.child_by_field("name")?;
                let values = node
                    .child_by_field("value")
                    .map(|v| vec![self.value(v, source)])
                    .unwrap_or_default();
                Some(Assignment {
                    target: name.text(source).to_string(),
                    target_keys: Vec::new(),
                    property: None,
                    values,
                    augmented: false,
                    site: site(node, source),
                })
            }
            _ => None,
        }
    }

    fn value<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Value {
        let node = unwrap_transparent(node);
        let shape = match node.kind() {
            "string" => ValueShape::StringLiteral,
            "template_string" => {
                if has_child_kind(node, "template_substitution") {
                    ValueShape::Interpolated
                } else {
                    ValueShape::StringLiteral
                }
            }
            "number" => ValueShape::NumberLiteral,
            "binary_expression" => ValueShape::Concatenation,
            "call_expression" => {
                let callee = node
                    .child_by_field("function")
                    .map(|f| compact(f.text(source)))
                    .unwrap_or_default();
                if FORMAT_CALLEES.contains(&callee.as_str()) {
                    ValueShape::FormatCall
                } else {
                    ValueShape::Call
                }
            }
            "new_expression" => ValueShape::Call,
            "identifier" | "member_expression" | "subscript_expression" | "this"
            | "spread_element" => ValueShape::Reference,
            _ => ValueShape::Other,
        };

        Value {
            shape,
            text: node.text(source).to_string(),
            keyword: None,
        }
    }
}

fn unwrap_transparent<N: SyntaxNode>(mut node: N) -> N {
    while TRANSPARENT.contains(&node.kind()) {
        match operands(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn member_property<N: SyntaxNode>(node: N, source: &[u8]) -> Option<String> {
    let node = unwrap_transparent(node);
    if node.kind() != "member_expression" {
        return None;
    }
    node.child_by_field("property")
        .map(|p| p.text(source).to_string())
}

/// Keys along a left-hand access chain, outermost first.
/// `a.b["c"].d` yields `["d", "c", "b"]`; computed non-string keys are skipped.
fn access_keys<N: SyntaxNode>(node: N, source: &[u8]) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = unwrap_transparent(node);

    loop {
        match current.kind() {
            "member_expression" => {
                if let Some(prop) = current.child_by_field("property") {
                    keys.push(prop.text(source).to_string());
                }
            }
            "subscript_expression" => {
                if let Some(index) = current.child_by_field("index").map(unwrap_transparent) {
                    let is_string_key = index.kind() == "string"
                        || (index.kind() == "template_string"
                            && !has_child_kind(index, "template_substitution"));
                    if is_string_key {
                        keys.push(unquote(index.text(source)).to_string());
                    }
                }
            }
            _ => break,
        }

        match current.child_by_field("object") {
            Some(object) => current = unwrap_transparent(object),
            None => break,
        }
    }

    keys
}
