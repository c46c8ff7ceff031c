use super::{compact, operands, site, LanguageParser, SyntaxNode};
use crate::ir::{Assignment, CallSite, Value, ValueShape};

pub struct GoParser;

const FORMAT_CALLEES: &[&str] = &["fmt.Sprintf", "fmt.Sprint", "fmt.Sprintln"];

impl LanguageParser for GoParser {
    fn call_site<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<CallSite> {
        if node.kind() != "call_expression" {
            return None;
        }
        let callee = node.child_by_field("function")?;
        let args = node
            .child_by_field("arguments")
            .map(|list| {
                operands(list)
                    .into_iter()
                    .map(|arg| self.value(arg, source))
                    .collect()
            })
            .unwrap_or_default();

        let property = if callee.kind() == "selector_expression" {
            callee
                .child_by_field("field")
                .map(|f| f.text(source).to_string())
        } else {
            None
        };

        Some(CallSite {
            callee: compact(callee.text(source)),
            property,
            construct: false,
            args,
            text: node.text(source).to_string(),
            site: site(node, source),
        })
    }

    fn assignment<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Option<Assignment> {
        let (target, values_node, augmented) = match node.kind() {
            "short_var_declaration" => (
                node.child_by_field("left")?.text(source).to_string(),
                node.child_by_field("right"),
                false,
            ),
            "assignment_statement" => {
                let augmented = node
                    .child_by_field("operator")
                    .map(|op| op.text(source).trim() != "=")
                    .unwrap_or(false);
                (
                    node.child_by_field("left")?.text(source).to_string(),
                    node.child_by_field("right"),
                    augmented,
                )
            }
            // `var a, b = ...` lists every name as a separate `name` field.
            "var_spec" | "const_spec" => {
                let names: Vec<&str> = operands(node)
                    .into_iter()
                    .filter(|c| c.kind() == "identifier")
                    .map(|c| c.text(source))
                    .collect();
                if names.is_empty() {
                    return None;
                }
                (names.join(", "), node.child_by_field("value"), false)
            }
            _ => return None,
        };

        let values = match values_node {
            Some(list) if list.kind() == "expression_list" => operands(list)
                .into_iter()
                .map(|v| self.value(v, source))
                .collect(),
            Some(single) => vec![self.value(single, source)],
            None => Vec::new(),
        };

        Some(Assignment {
            target,
            target_keys: Vec::new(),
            property: None,
            values,
            augmented,
            site: site(node, source),
        })
    }

    fn value<N: SyntaxNode>(&self, node: N, source: &[u8]) -> Value {
        let mut node = node;
        while node.kind() == "parenthesized_expression" {
            match operands(node).into_iter().next() {
                Some(inner) => node = inner,
                None => break,
            }
        }

        let shape = match node.kind() {
            "interpreted_string_literal" | "raw_string_literal" => ValueShape::StringLiteral,
            "int_literal" | "float_literal" | "imaginary_literal" | "rune_literal" => {
                ValueShape::NumberLiteral
            }
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
            "identifier" | "selector_expression" | "index_expression" | "variadic_argument" => {
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
