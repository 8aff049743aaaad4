//! Outer structural check for the manifest document.
//!
//! Before any spec-level rule runs, the manifest must satisfy a JSON-Schema
//! description of its top-level shape: required identity keys, the nested
//! output provider map, and the input reference format.

use serde_json::json;

use crate::error::{ManifestError, ManifestResult};

/// JSON Schema the manifest document must satisfy.
pub fn manifest_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "intent": {"type": "string"},
            "flavor": {"type": "string"},
            "version": {"type": ["string", "number"]},
            "description": {"type": "string"},
            "clouds": {
                "type": "array",
                "items": {"type": "string"}
            },
            "spec": {"type": "object"},
            "outputs": {
                "type": "object",
                "patternProperties": {
                    ".*": {
                        "type": "object",
                        "properties": {
                            "type": {"type": "string", "pattern": "^@outputs/.+"},
                            "providers": {
                                "type": "object",
                                "patternProperties": {
                                    ".*": {
                                        "type": "object",
                                        "properties": {
                                            "source": {"type": "string"},
                                            "version": {"type": "string"},
                                            "attributes": {
                                                "type": "object",
                                                "patternProperties": {
                                                    ".*": {"type": "string"}
                                                }
                                            }
                                        },
                                        "required": ["source", "version", "attributes"]
                                    }
                                }
                            }
                        },
                        "required": ["type"]
                    }
                }
            },
            "inputs": {
                "type": "object",
                "patternProperties": {
                    ".*": {
                        "type": "object",
                        "properties": {
                            "type": {"type": "string", "pattern": "^@outputs/.+"},
                            "providers": {
                                "type": "array",
                                "items": {"type": "string"}
                            }
                        },
                        "required": ["type"]
                    }
                }
            },
            "sample": {"type": "object"},
            "artifact_inputs": {
                "type": "object",
                "properties": {
                    "primary": {
                        "type": "object",
                        "properties": {
                            "attribute_path": {"type": "string"},
                            "artifact_type": {"type": "string", "enum": ["docker_image"]}
                        },
                        "required": ["attribute_path", "artifact_type"]
                    }
                },
                "required": ["primary"]
            },
            "metadata": {"type": "object"}
        },
        "required": ["intent", "flavor", "version", "description", "spec"]
    })
}

/// Validate a parsed manifest against [`manifest_schema`].
///
/// Reports the first violation with its location inside the document.
pub fn check_structure(document: &serde_yaml::Value) -> ManifestResult<()> {
    let instance = serde_json::to_value(document)?;
    let schema = manifest_schema();
    let compiled = jsonschema::JSONSchema::compile(&schema)
        .map_err(|e| ManifestError::Structural(e.to_string()))?;

    if let Err(mut errors) = compiled.validate(&instance) {
        if let Some(error) = errors.next() {
            return Err(ManifestError::Structural(format!(
                "{} (at {})",
                error, error.instance_path
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_minimal_manifest_passes() {
        let doc = parse(
            r#"
intent: db
flavor: postgres
version: "1.0"
description: A database
spec:
  type: object
  properties: {}
"#,
        );
        assert!(check_structure(&doc).is_ok());
    }

    #[test]
    fn test_missing_required_key_fails() {
        let doc = parse("intent: db\nflavor: postgres\n");
        let err = check_structure(&doc).unwrap_err();
        assert!(matches!(err, ManifestError::Structural(_)));
    }

    #[test]
    fn test_input_type_must_reference_outputs() {
        let doc = parse(
            r#"
intent: db
flavor: postgres
version: "1.0"
description: A database
spec:
  type: object
inputs:
  network:
    type: not-a-reference
"#,
        );
        let err = check_structure(&doc).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/inputs/network"), "{message}");
    }

    #[test]
    fn test_output_provider_requires_attributes() {
        let doc = parse(
            r#"
intent: db
flavor: postgres
version: "1.0"
description: A database
spec:
  type: object
outputs:
  default:
    type: "@outputs/db"
    providers:
      aws:
        source: hashicorp/aws
        version: "5.0"
"#,
        );
        assert!(check_structure(&doc).is_err());
    }
}
