//! The schema tree describing a module's configurable surface.
//!
//! The manifest's `spec` block is a restricted JSON-Schema document. It is
//! modeled here as a closed union so that a node can never carry both
//! `properties` and `patternProperties`: mixing them fails at
//! deserialization instead of surfacing later as scattered runtime checks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{ManifestError, ManifestResult};

/// Key pattern applied to dynamic objects when none is given.
pub const DEFAULT_KEY_PATTERN: &str = "^[a-zA-Z0-9_.-]+$";

/// Type names accepted by `add-variable`, including the `enum` pseudo-type.
pub const ALLOWED_TYPE_NAMES: [&str; 7] = [
    "string", "number", "integer", "boolean", "array", "object", "enum",
];

/// Base JSON-schema types a leaf property can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Number => "number",
            BaseType::Integer => "integer",
            BaseType::Boolean => "boolean",
            BaseType::Object => "object",
            BaseType::Array => "array",
        }
    }

    /// The Terraform type keyword this base type projects to.
    pub fn terraform_type(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Number | BaseType::Integer => "number",
            BaseType::Boolean => "bool",
            BaseType::Object => "any",
            BaseType::Array => "list(any)",
        }
    }
}

/// UI presentation hints (`x-ui-*` annotations) attached to a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiHints {
    /// The property is fixed at its default; environments cannot override it.
    pub override_disable: bool,
    /// The property may only be set per environment, never at module level.
    pub overrides_only: bool,
    /// The property is edited as a raw YAML document in the UI.
    pub yaml_editor: bool,
}

/// A node in the manifest's spec tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum SchemaNode {
    /// A terminal property with a concrete base type.
    Leaf(Leaf),
    /// An object with fixed, named properties.
    FixedObject(FixedObject),
    /// An object whose children are addressed by a key pattern.
    DynamicObject(DynamicObject),
}

/// A terminal property.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leaf {
    pub base_type: Option<BaseType>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Present iff the property was declared as an enum; the on-disk type
    /// stays `string`.
    pub enum_values: Option<Vec<String>>,
    pub default: Option<Value>,
    /// Optional regex constraint for string values.
    pub pattern: Option<String>,
    pub hints: UiHints,
}

/// An object node with fixed property names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixedObject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub properties: BTreeMap<String, SchemaNode>,
    pub required: BTreeSet<String>,
    pub hints: UiHints,
}

/// An object node whose children match a single key pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicObject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub key_pattern: String,
    pub value: Box<SchemaNode>,
    pub hints: UiHints,
}

impl DynamicObject {
    pub fn new(value: SchemaNode) -> Self {
        Self {
            title: None,
            description: None,
            key_pattern: DEFAULT_KEY_PATTERN.to_string(),
            value: Box::new(value),
            hints: UiHints::default(),
        }
    }
}

impl SchemaNode {
    /// An object node with no properties yet, the shape intermediate path
    /// segments are materialized with.
    pub fn empty_object() -> Self {
        SchemaNode::FixedObject(FixedObject::default())
    }

    /// Human-readable shape name, used in error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            SchemaNode::Leaf(leaf) => leaf
                .base_type
                .map(|t| t.as_str())
                .unwrap_or("untyped"),
            SchemaNode::FixedObject(_) => "properties",
            SchemaNode::DynamicObject(_) => "patternProperties",
        }
    }

    /// The base type this node resolves to (`object` for object shapes).
    pub fn resolved_type(&self) -> BaseType {
        match self {
            SchemaNode::Leaf(leaf) => leaf.base_type.unwrap_or(BaseType::Object),
            SchemaNode::FixedObject(_) | SchemaNode::DynamicObject(_) => BaseType::Object,
        }
    }

    pub fn hints(&self) -> &UiHints {
        match self {
            SchemaNode::Leaf(leaf) => &leaf.hints,
            SchemaNode::FixedObject(obj) => &obj.hints,
            SchemaNode::DynamicObject(dyn_obj) => &dyn_obj.hints,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            SchemaNode::Leaf(leaf) => leaf.title.as_deref(),
            SchemaNode::FixedObject(obj) => obj.title.as_deref(),
            SchemaNode::DynamicObject(dyn_obj) => dyn_obj.title.as_deref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaNode::Leaf(leaf) => leaf.description.as_deref(),
            SchemaNode::FixedObject(obj) => obj.description.as_deref(),
            SchemaNode::DynamicObject(dyn_obj) => dyn_obj.description.as_deref(),
        }
    }
}

impl Leaf {
    /// Build a leaf from the raw strings an `add-variable` invocation
    /// supplies, validating the type name, enum options and default value.
    pub fn from_user_input(
        type_name: &str,
        description: &str,
        title: Option<&str>,
        options: &[String],
        default: Option<&str>,
    ) -> ManifestResult<Self> {
        if !ALLOWED_TYPE_NAMES.contains(&type_name) {
            return Err(ManifestError::DisallowedType {
                given: type_name.to_string(),
                allowed: ALLOWED_TYPE_NAMES.join(", "),
            });
        }

        let is_enum = type_name == "enum";
        if is_enum && options.is_empty() {
            return Err(ManifestError::MissingEnumOptions);
        }

        // Enums are stored as string leaves carrying an enum list.
        let base_type = if is_enum {
            BaseType::String
        } else {
            match type_name {
                "string" => BaseType::String,
                "number" => BaseType::Number,
                "integer" => BaseType::Integer,
                "boolean" => BaseType::Boolean,
                "object" => BaseType::Object,
                _ => BaseType::Array,
            }
        };

        let enum_values = is_enum.then(|| options.to_vec());
        let default = default
            .map(|raw| parse_default_value(type_name, raw, enum_values.as_deref()))
            .transpose()?;

        Ok(Leaf {
            base_type: Some(base_type),
            title: title.map(|t| t.to_string()),
            description: Some(description.to_string()),
            enum_values,
            default,
            pattern: None,
            hints: UiHints::default(),
        })
    }
}

/// Parse and type-check a textual default value against the declared type.
pub fn parse_default_value(
    type_name: &str,
    raw: &str,
    enum_values: Option<&[String]>,
) -> ManifestResult<Value> {
    match type_name {
        "number" | "integer" => {
            let parsed: f64 = raw.parse().map_err(|_| ManifestError::InvalidDefault {
                expected: type_name.to_string(),
                message: format!("'{raw}' is not a valid number"),
            })?;
            if type_name == "integer" && parsed.fract() != 0.0 {
                return Err(ManifestError::InvalidDefault {
                    expected: type_name.to_string(),
                    message: format!("'{raw}' is not a whole number"),
                });
            }
            Ok(serde_yaml::from_str(raw).unwrap_or(Value::Number(parsed.into())))
        }
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ManifestError::InvalidDefault {
                expected: "boolean".to_string(),
                message: "must be 'true' or 'false'".to_string(),
            }),
        },
        "enum" => {
            let options = enum_values.unwrap_or_default();
            if options.iter().any(|o| o == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(ManifestError::InvalidDefault {
                    expected: "enum".to_string(),
                    message: format!("must be one of the options: {}", options.join(",")),
                })
            }
        }
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// On-disk mirror of [`SchemaNode`]. All shape fields are optional here;
/// the conversion into the closed union enforces their exclusivity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    node_type: Option<BaseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<BTreeMap<String, SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<BTreeSet<String>>,
    #[serde(
        rename = "patternProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pattern_properties: Option<BTreeMap<String, SchemaNode>>,
    #[serde(rename = "keyPattern", default, skip_serializing_if = "Option::is_none")]
    key_pattern: Option<String>,
    #[serde(
        rename = "x-ui-override-disable",
        default,
        skip_serializing_if = "is_false"
    )]
    override_disable: bool,
    #[serde(
        rename = "x-ui-overrides-only",
        default,
        skip_serializing_if = "is_false"
    )]
    overrides_only: bool,
    #[serde(rename = "x-ui-yaml-editor", default, skip_serializing_if = "is_false")]
    yaml_editor: bool,
}

impl RawNode {
    fn hints(&self) -> UiHints {
        UiHints {
            override_disable: self.override_disable,
            overrides_only: self.overrides_only,
            yaml_editor: self.yaml_editor,
        }
    }
}

impl TryFrom<RawNode> for SchemaNode {
    type Error = ManifestError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.properties.is_some() && raw.pattern_properties.is_some() {
            return Err(ManifestError::MixedShape);
        }

        let hints = raw.hints();

        if let Some(properties) = raw.properties {
            return Ok(SchemaNode::FixedObject(FixedObject {
                title: raw.title,
                description: raw.description,
                properties,
                required: raw.required.unwrap_or_default(),
                hints,
            }));
        }

        if let Some(pattern_properties) = raw.pattern_properties {
            let mut entries = pattern_properties.into_iter();
            let (pattern_key, value) = match (entries.next(), entries.next()) {
                (Some(entry), None) => entry,
                _ => return Err(ManifestError::PatternEntryCount),
            };
            return Ok(SchemaNode::DynamicObject(DynamicObject {
                title: raw.title,
                description: raw.description,
                key_pattern: raw.key_pattern.unwrap_or(pattern_key),
                value: Box::new(value),
                hints,
            }));
        }

        Ok(SchemaNode::Leaf(Leaf {
            base_type: raw.node_type,
            title: raw.title,
            description: raw.description,
            enum_values: raw.enum_values,
            default: raw.default,
            pattern: raw.pattern,
            hints,
        }))
    }
}

impl From<SchemaNode> for RawNode {
    fn from(node: SchemaNode) -> Self {
        let empty = RawNode {
            node_type: None,
            title: None,
            description: None,
            enum_values: None,
            default: None,
            pattern: None,
            properties: None,
            required: None,
            pattern_properties: None,
            key_pattern: None,
            override_disable: false,
            overrides_only: false,
            yaml_editor: false,
        };

        match node {
            SchemaNode::Leaf(leaf) => RawNode {
                node_type: leaf.base_type,
                title: leaf.title,
                description: leaf.description,
                enum_values: leaf.enum_values,
                default: leaf.default,
                pattern: leaf.pattern,
                override_disable: leaf.hints.override_disable,
                overrides_only: leaf.hints.overrides_only,
                yaml_editor: leaf.hints.yaml_editor,
                ..empty
            },
            SchemaNode::FixedObject(obj) => RawNode {
                node_type: Some(BaseType::Object),
                title: obj.title,
                description: obj.description,
                properties: Some(obj.properties),
                required: (!obj.required.is_empty()).then_some(obj.required),
                override_disable: obj.hints.override_disable,
                overrides_only: obj.hints.overrides_only,
                yaml_editor: obj.hints.yaml_editor,
                ..empty
            },
            SchemaNode::DynamicObject(dyn_obj) => {
                let mut pattern_properties = BTreeMap::new();
                pattern_properties.insert(dyn_obj.key_pattern.clone(), *dyn_obj.value);
                RawNode {
                    node_type: Some(BaseType::Object),
                    title: dyn_obj.title,
                    description: dyn_obj.description,
                    pattern_properties: Some(pattern_properties),
                    key_pattern: Some(dyn_obj.key_pattern),
                    override_disable: dyn_obj.hints.override_disable,
                    overrides_only: dyn_obj.hints.overrides_only,
                    yaml_editor: dyn_obj.hints.yaml_editor,
                    ..empty
                }
            }
        }
    }
}
