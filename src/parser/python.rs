use super::{compact, has_child_kind, operands, site, unquote, LanguageParser, SyntaxNode};
use crate::ir::{Assignment, CallSite, Value, ValueShape};

pub struct PythonParser;

impl LanguageParser for PythonParser {
    fn call_site<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<CallSite> {
        if node.kind() != "call" {
            return None;
        }
        let callee = node.child_by_field("function")?;

        let args = match node.child_by_field("arguments") {
            Some(list) if list.kind() == "argument_list" => operands(list)
                .into_iter()
                .map(|arg| self.argument(arg, source))
                .collect(),
            // `f(x for x in y)`: a bare generator argument.
            Some(generator) => vec![self.value(generator, source)],
            None => Vec::new(),
        };

        Some(CallSite {
            callee: compact(callee.text(source)),
            property: attribute_name(callee, source),
            construct: false,
            args,
            text: node.text(source).to_string(),
            site: site(node, source),
        })
    }

    fn assignment<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<Assignment> {
        let augmented = match node.kind() {
            "assignment" => false,
            "augmented_assignment" => true,
            _ => return None,
        };
        let left = node.child_by_field("left")?;

        // `x: int` has no right-hand side.
        let values = match node.child_by_field("right") {
            Some(right) if right.kind() == "expression_list" => operands(right)
                .into_iter()
                .map(|v| self.value(v, source))
                .collect(),
            Some(right) => vec![self.value(right, source)],
            None => Vec::new(),
        };

        Some(Assignment {
            target: left.text(source).to_string(),
            target_keys: access_keys(left, source),
            property: attribute_name(left, source),
            values,
            augmented,
            site: site(node, source),
        })
    }

    fn value<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Value {
        let node = unwrap_transparent(node);
        let shape = match node.kind() {
            "string" => string_shape(node),
            "concatenated_string" => {
                if operands(node)
                    .into_iter()
                    .any(|part| string_shape(part) == ValueShape::Interpolated)
                {
                    ValueShape::Interpolated
                } else {
                    ValueShape::StringLiteral
                }
            }
            "integer" | "float" => ValueShape::NumberLiteral,
            "binary_operator" => ValueShape::Concatenation,
            "call" => {
                let callee = node
                    .child_by_field("function")
                    .map(|f| compact(f.text(source)))
                    .unwrap_or_default();
                if callee.ends_with(".format") {
                    ValueShape::FormatCall
                } else {
                    ValueShape::Call
                }
            }
            "identifier" | "attribute" | "subscript" | "list_splat" | "dictionary_splat" => {
                ValueShape::Reference
            }
            _ => ValueShape::Other,
        };

        Value {
            shape,
            text: node.text(source).to_string(),
            keyword: None,
        }
    }
}

impl PythonParser {
    /// A call argument; keyword arguments keep their name.
    fn argument<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Value {
        if node.kind() == "keyword_argument" {
            if let Some(value) = node.child_by_field("value") {
                let mut lowered = self.value(value, source);
                lowered.keyword = node
                    .child_by_field("name")
                    .map(|n| n.text(source).to_string());
                return lowered;
            }
        }
        self.value(node, source)
    }
}

fn string_shape<N: SyntaxNode>(node: N) -> ValueShape {
    if has_child_kind(node, "interpolation") {
        ValueShape::Interpolated
    } else {
        ValueShape::StringLiteral
    }
}

fn unwrap_transparent<N: SyntaxNode>(mut node: N) -> N {
    while matches!(node.kind(), "parenthesized_expression" | "await") {
        match operands(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn attribute_name<N: SyntaxNode>(node: N, source: &[u8]) -> Option<String> {
    if node.kind() != "attribute" {
        return None;
    }
    node.child_by_field("attribute")
        .map(|a| a.text(source).to_string())
}

/// Attribute names and string subscripts along a target, outermost first.
fn access_keys<N: SyntaxNode>(node: N, source: &[u8]) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = node;

    loop {
        let next = match current.kind() {
            "attribute" => {
                if let Some(attr) = current.child_by_field("attribute") {
                    keys.push(attr.text(source).to_string());
                }
                current.child_by_field("object")
            }
            "subscript" => {
                if let Some(key) = current.child_by_field("subscript") {
                    if key.kind() == "string" && string_shape(key) == ValueShape::StringLiteral {
                        keys.push(unquote(key.text(source)).to_string());
                    }
                }
                current.child_by_field("value")
            }
            _ => None,
        };
        match next {
            Some(n) => current = n,
            None => break,
        }
    }

    keys
}
