//! Spec tree validation rules.
//!
//! Rules run depth-first over the manifest's `spec` tree and raise on the
//! first violation, naming the offending dot-path. The provider-block scan
//! (the one aggregating rule) lives in [`crate::provider`].

use std::fmt;

use regex::Regex;
use tfmod_manifest::{BaseType, SchemaNode};

use crate::error::{ValidateError, ValidateResult};

/// Which rule a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ArrayType,
    PatternShape,
    KeyPattern,
    UiConflict,
    MissingDocumentation,
    ProviderBlock,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::ArrayType => "array-type",
            Rule::PatternShape => "pattern-shape",
            Rule::KeyPattern => "key-pattern",
            Rule::UiConflict => "ui-conflict",
            Rule::MissingDocumentation => "missing-documentation",
            Rule::ProviderBlock => "provider-block",
        }
    }
}

/// A single rule violation at a spec path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub path: String,
    pub rule: Rule,
    pub message: String,
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn fail(path: &str, rule: Rule, message: String) -> ValidateError {
    ValidateError::Rule(ValidationFinding {
        path: path.to_string(),
        rule,
        message,
    })
}

/// Run every spec rule against the tree rooted at the manifest's `spec`.
pub fn validate_spec(spec: &SchemaNode) -> ValidateResult<()> {
    check_node(spec, "spec", false, false)
}

/// Visit one node. `require_docs` holds for property children of a fixed
/// object; `exempt` is set once an ancestor disabled overrides.
fn check_node(
    node: &SchemaNode,
    path: &str,
    exempt: bool,
    require_docs: bool,
) -> ValidateResult<()> {
    let hints = node.hints();

    if node.resolved_type() == BaseType::Array {
        return Err(fail(
            path,
            Rule::ArrayType,
            format!("Invalid array type found at {path}"),
        ));
    }

    if require_docs {
        check_documentation(node, path, exempt)?;
    }

    if hints.override_disable && hints.overrides_only {
        return Err(fail(
            path,
            Rule::UiConflict,
            format!(
                "x-ui-override-disable and x-ui-overrides-only are mutually exclusive at {path}: \
                 override-disable fixes the value to its default while overrides-only requires \
                 setting it per environment"
            ),
        ));
    }

    let exempt = exempt || hints.override_disable;

    match node {
        SchemaNode::Leaf(_) => Ok(()),
        SchemaNode::FixedObject(object) => {
            for (name, child) in &object.properties {
                let child_path = format!("{path}.{name}");
                check_node(child, &child_path, exempt, true)?;
            }
            Ok(())
        }
        SchemaNode::DynamicObject(dynamic) => {
            if hints.yaml_editor {
                return Err(fail(
                    path,
                    Rule::UiConflict,
                    format!(
                        "x-ui-yaml-editor and patternProperties are mutually exclusive at {path}"
                    ),
                ));
            }

            if Regex::new(&dynamic.key_pattern).is_err() {
                return Err(fail(
                    path,
                    Rule::KeyPattern,
                    format!(
                        "keyPattern '{}' at {path} is not a valid regular expression",
                        dynamic.key_pattern
                    ),
                ));
            }

            if !permitted_pattern_value(&dynamic.value) {
                return Err(fail(
                    path,
                    Rule::PatternShape,
                    format!(
                        "patternProperties at {path} must resolve to an object or a permitted \
                         scalar type, found '{}'",
                        dynamic.value.shape_name()
                    ),
                ));
            }

            check_node(&dynamic.value, &format!("{path}.*"), exempt, false)
        }
    }
}

/// Shapes a dynamic object's value may take: object nodes or the
/// permitted primitives.
fn permitted_pattern_value(value: &SchemaNode) -> bool {
    !matches!(value.resolved_type(), BaseType::Array)
}

/// Leaf and object properties under `properties` must carry a title and a
/// description, unless the property or an ancestor disables overrides.
fn check_documentation(node: &SchemaNode, path: &str, exempt: bool) -> ValidateResult<()> {
    if exempt || node.hints().override_disable {
        return Ok(());
    }

    let mut missing = Vec::new();
    if node.title().map_or(true, |t| t.trim().is_empty()) {
        missing.push("title");
    }
    if node.description().map_or(true, |d| d.trim().is_empty()) {
        missing.push("description");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(fail(
            path,
            Rule::MissingDocumentation,
            format!("{} missing for property at {path}", missing.join(", ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(yaml: &str) -> SchemaNode {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn expect_rule(result: ValidateResult<()>, rule: Rule) -> ValidationFinding {
        match result {
            Err(ValidateError::Rule(finding)) if finding.rule == rule => finding,
            other => panic!("expected {rule:?} violation, got {other:?}"),
        }
    }

    #[test]
    fn test_array_type_is_rejected_with_path() {
        let tree = spec(
            r#"
type: object
properties:
  servers:
    title: Servers
    description: Server list
    type: object
    properties:
      names:
        title: Names
        description: Server names
        type: array
"#,
        );
        let finding = expect_rule(validate_spec(&tree), Rule::ArrayType);
        assert_eq!(finding.path, "spec.servers.names");
        assert_eq!(
            finding.message,
            "Invalid array type found at spec.servers.names"
        );
    }

    #[test]
    fn test_yaml_editor_conflicts_with_pattern_properties() {
        let tree = spec(
            r#"
type: object
properties:
  env:
    title: Env
    description: Environment variables
    type: object
    x-ui-yaml-editor: true
    patternProperties:
      "^[a-zA-Z0-9_.-]+$":
        type: string
        title: Value
        description: Variable value
"#,
        );
        let finding = expect_rule(validate_spec(&tree), Rule::UiConflict);
        assert_eq!(finding.path, "spec.env");
        assert!(finding.message.contains("mutually exclusive"));
    }

    #[test]
    fn test_override_hint_conflict() {
        let tree = spec(
            r#"
type: object
properties:
  size:
    title: Size
    description: Instance size
    type: string
    x-ui-override-disable: true
    x-ui-overrides-only: true
"#,
        );
        let finding = expect_rule(validate_spec(&tree), Rule::UiConflict);
        assert_eq!(finding.path, "spec.size");
    }

    #[test]
    fn test_missing_documentation_lists_fields() {
        let tree = spec(
            r#"
type: object
properties:
  cpu:
    type: number
"#,
        );
        let finding = expect_rule(validate_spec(&tree), Rule::MissingDocumentation);
        assert_eq!(finding.path, "spec.cpu");
        assert_eq!(
            finding.message,
            "title, description missing for property at spec.cpu"
        );
    }

    #[test]
    fn test_missing_description_only() {
        let tree = spec(
            r#"
type: object
properties:
  cpu:
    title: CPU
    type: number
"#,
        );
        let finding = expect_rule(validate_spec(&tree), Rule::MissingDocumentation);
        assert_eq!(finding.message, "description missing for property at spec.cpu");
    }

    #[test]
    fn test_override_disable_exempts_descendants() {
        let yaml = r#"
type: object
properties:
  advanced:
    title: Advanced
    description: Advanced settings
    type: object
    x-ui-override-disable: true
    properties:
      inner:
        title: Inner
        description: Inner settings
        type: object
        properties:
          leaf:
            type: string
"#;
        assert!(validate_spec(&spec(yaml)).is_ok());

        // dropping the exemption surfaces the undocumented descendant
        let without = yaml.replace("    x-ui-override-disable: true\n", "");
        let finding = expect_rule(validate_spec(&spec(&without)), Rule::MissingDocumentation);
        assert_eq!(finding.path, "spec.advanced.inner.leaf");
    }

    #[test]
    fn test_overrides_only_does_not_exempt_documentation() {
        let tree = spec(
            r#"
type: object
properties:
  cpu:
    type: number
    x-ui-overrides-only: true
"#,
        );
        expect_rule(validate_spec(&tree), Rule::MissingDocumentation);
    }

    #[test]
    fn test_invalid_key_pattern_is_reported() {
        let tree = spec(
            r#"
type: object
properties:
  env:
    title: Env
    description: Environment variables
    type: object
    keyPattern: "[unclosed"
    patternProperties:
      "[unclosed":
        type: string
        title: Value
        description: Variable value
"#,
        );
        let finding = expect_rule(validate_spec(&tree), Rule::KeyPattern);
        assert_eq!(finding.path, "spec.env");
    }

    #[test]
    fn test_documented_spec_passes() {
        let tree = spec(
            r#"
type: object
properties:
  cpu:
    title: CPU
    description: Number of CPUs
    type: number
  env:
    title: Env
    description: Environment variables
    type: object
    patternProperties:
      "^[a-zA-Z0-9_.-]+$":
        type: string
        title: Value
        description: Variable value
"#,
        );
        assert!(validate_spec(&tree).is_ok());
    }
}
