//! The lookup tree document and type inference over raw output values.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::LookupResult;

/// A registered output's lookup tree as stored by the control plane.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupTree {
    #[serde(default)]
    pub out: LookupSections,
}

/// The two addressable sections of an output: plain attributes and the
/// provider-facing interfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSections {
    #[serde(default = "empty_object")]
    pub attributes: Value,
    #[serde(default = "empty_object")]
    pub interfaces: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Default for LookupSections {
    fn default() -> Self {
        LookupSections {
            attributes: empty_object(),
            interfaces: empty_object(),
        }
    }
}

impl LookupTree {
    pub fn new(attributes: Value, interfaces: Value) -> Self {
        LookupTree {
            out: LookupSections {
                attributes,
                interfaces,
            },
        }
    }
}

/// Parse the JSON form of a lookup tree as served by the registry.
pub fn parse_lookup_tree(raw: &str) -> LookupResult<LookupTree> {
    Ok(serde_json::from_str(raw)?)
}

/// Infer a typed lookup tree from a concrete output value.
///
/// Scalars become `{"type": <scalar>}` tags, lists become array nodes
/// shaped by their first element, and mappings recurse per key. Used when
/// a module's `locals` declare literal output values rather than a schema.
pub fn infer_output_tree(value: &Value) -> Value {
    match value {
        Value::String(_) => json!({"type": "string"}),
        Value::Number(_) => json!({"type": "number"}),
        Value::Bool(_) => json!({"type": "boolean"}),
        Value::Null => json!({"type": "any"}),
        Value::Array(items) => match items.first() {
            Some(first) => json!({"type": "array", "items": infer_output_tree(first)}),
            None => json!({"type": "array"}),
        },
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), infer_output_tree(child)))
                .collect(),
        ),
    }
}
