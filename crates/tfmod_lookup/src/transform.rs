//! Rendering of output lookup trees.
//!
//! A lookup tree arrives as nested JSON maps. Leaf nodes either carry an
//! explicit `type` tag or are plain scalars whose concrete value is
//! irrelevant. Two renderings consume the same recursion: a full Terraform
//! type expression for `variables.tf`, and a stripped "lookup" shape that
//! keeps structure but drops scalar type commitments.

use serde_json::{Map, Value};

/// Structural role of a node within a lookup tree.
///
/// The typed-leaf/untyped-leaf split is deliberate: classification happens
/// once, so a mapping that merely contains a child named `type` (with a
/// non-string value) is never mistaken for a typed leaf.
enum NodeKind<'a> {
    /// A leaf tagged `{"type": "..."}`, optionally carrying `items`.
    TypedLeaf {
        kind: &'a str,
        items: Option<&'a Value>,
    },
    /// A mapping of child name to node.
    Mapping(&'a Map<String, Value>),
    /// A plain JSON list, not wrapped as a typed node.
    List(&'a [Value]),
    /// Any scalar; its concrete value carries no type information.
    UntypedLeaf,
}

fn classify(node: &Value) -> NodeKind<'_> {
    match node {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(kind)) => NodeKind::TypedLeaf {
                kind,
                items: map.get("items"),
            },
            _ => NodeKind::Mapping(map),
        },
        Value::Array(items) => NodeKind::List(items),
        _ => NodeKind::UntypedLeaf,
    }
}

/// Render a lookup tree node as a Terraform type expression.
///
/// `level` is the current nesting depth; entries of an `object({...})` are
/// indented two spaces per level and the closing brace lines up with the
/// opening line.
pub fn to_terraform_type(node: &Value, level: usize) -> String {
    match classify(node) {
        NodeKind::TypedLeaf { kind, items } => match kind {
            "array" => match items {
                Some(items) => format!("list({})", to_terraform_type(items, level)),
                None => "list(any)".to_string(),
            },
            "object" => "object({})".to_string(),
            "boolean" => "bool".to_string(),
            other => other.to_string(),
        },
        NodeKind::Mapping(map) => {
            if map.is_empty() {
                return "object({})".to_string();
            }
            let indent = "  ".repeat(level + 1);
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| {
                    format!("{indent}{key} = {}", to_terraform_type(value, level + 1))
                })
                .collect();
            format!(
                "object({{\n{}\n{}}})",
                entries.join(",\n"),
                "  ".repeat(level)
            )
        }
        NodeKind::List(items) => match items.first() {
            Some(first) => format!("list({})", to_terraform_type(first, level)),
            None => "list(any)".to_string(),
        },
        NodeKind::UntypedLeaf => "any".to_string(),
    }
}

/// Render the stripped lookup shape of a node.
///
/// Scalar leaves collapse to `{}`, array wrapping is preserved as
/// `{"type": "array", "items": <recurse>}`, and mapping structure is kept.
pub fn to_lookup_shape(node: &Value) -> Value {
    match classify(node) {
        NodeKind::TypedLeaf { kind, items } => {
            if kind == "array" {
                let mut shape = Map::new();
                shape.insert("type".to_string(), Value::String("array".to_string()));
                if let Some(items) = items {
                    shape.insert("items".to_string(), to_lookup_shape(items));
                }
                Value::Object(shape)
            } else {
                Value::Object(Map::new())
            }
        }
        NodeKind::Mapping(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_lookup_shape(value)))
                .collect(),
        ),
        NodeKind::List(items) => {
            let mut shape = Map::new();
            shape.insert("type".to_string(), Value::String("array".to_string()));
            if let Some(first) = items.first() {
                shape.insert("items".to_string(), to_lookup_shape(first));
            }
            Value::Object(shape)
        }
        NodeKind::UntypedLeaf => Value::Object(Map::new()),
    }
}
