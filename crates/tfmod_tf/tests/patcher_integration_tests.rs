//! Integration tests for Terraform block patching.

use std::collections::BTreeMap;

use tfmod_lookup::to_terraform_type;
use tfmod_tf::{replace_or_append_variable_block, replace_variable_block_body};

const FULL_FILE: &str = r#"resource "aws_s3_bucket" "artifacts" {
  bucket = "artifacts-${var.instance_name}"

  tags = {
    ManagedBy = "tfmod"
  }
}

variable "inputs" {
  description = "A map of inputs requested by the module developer."
  inputs = object({
    stale = string
  })
}

resource "aws_db_instance" "main" {
  engine = "postgres"
}
"#;

fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Patching a variable body leaves every byte outside the span untouched.
#[test]
fn test_patch_preserves_surrounding_blocks() {
    let patched = replace_variable_block_body(
        FULL_FILE,
        "inputs",
        "inputs",
        &entries(&[("network.attributes", "any"), ("network.interfaces", "any")]),
    )
    .unwrap();

    let before = &FULL_FILE[..FULL_FILE.find("variable \"inputs\"").unwrap()];
    let after = &FULL_FILE[FULL_FILE.find("resource \"aws_db_instance\"").unwrap()..];
    assert!(patched.starts_with(before));
    assert!(patched.ends_with(after));

    assert!(!patched.contains("stale"));
    assert!(patched.contains("network = object({"));
    assert!(patched.contains("attributes = any"));
    assert!(patched.contains("interfaces = any"));
}

/// Patching twice with the same entries is idempotent.
#[test]
fn test_patch_is_idempotent() {
    let entries = entries(&[("cpu", "number"), ("runtime.memory", "string")]);
    let once = replace_variable_block_body(FULL_FILE, "inputs", "inputs", &entries).unwrap();
    let twice = replace_variable_block_body(&once, "inputs", "inputs", &entries).unwrap();
    assert_eq!(once, twice);
}

/// A rendered inputs variable built from lookup trees replaces the old
/// block wholesale and can itself be replaced again.
#[test]
fn test_rendered_inputs_variable_round_trip() {
    let tree = serde_json::json!({
        "host": {"type": "string"},
        "ports": {"type": "array", "items": {"type": "number"}}
    });
    let block = format!(
        "variable \"inputs\" {{\n  description = \"A map of inputs requested by the module developer.\"\n  type = object({{\n    db = object({{\n      attributes = {}\n      interfaces = object({{}})\n    }})\n  }})\n}}",
        to_terraform_type(&tree, 3)
    );

    let replaced = replace_or_append_variable_block(FULL_FILE, "inputs", &block).unwrap();
    assert_eq!(replaced.matches("variable \"inputs\"").count(), 1);
    assert!(replaced.contains("host = string"));
    assert!(replaced.contains("ports = list(number)"));
    assert!(replaced.contains("resource \"aws_s3_bucket\" \"artifacts\""));
    assert!(replaced.contains("resource \"aws_db_instance\" \"main\""));

    let again = replace_or_append_variable_block(&replaced, "inputs", &block).unwrap();
    assert_eq!(again.matches("variable \"inputs\"").count(), 1);
}
