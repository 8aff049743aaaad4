//! Module scaffolding.
//!
//! Generates the directory layout and starter files of a new module:
//! `<intent>/<flavor>/<version>/` containing `facets.yaml`, `main.tf`,
//! `variables.tf` and `outputs.tf`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::TfResult;

/// Version every freshly scaffolded module starts at.
pub const INITIAL_VERSION: &str = "1.0";

/// Parameters of a module scaffold.
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    pub intent: String,
    pub flavor: String,
    pub cloud: String,
    pub title: String,
    pub description: String,
}

/// Generate a new module under `base_dir`, returning the module directory.
pub fn scaffold_module(base_dir: &Path, options: &ScaffoldOptions) -> TfResult<PathBuf> {
    let module_dir = base_dir
        .join(&options.intent)
        .join(&options.flavor)
        .join(INITIAL_VERSION);
    info!("Generating module scaffold at {:?}", module_dir);

    fs::create_dir_all(&module_dir)?;
    fs::write(module_dir.join("facets.yaml"), facets_yaml(options))?;
    fs::write(module_dir.join("main.tf"), main_tf(options))?;
    fs::write(module_dir.join("variables.tf"), variables_tf(options))?;
    fs::write(module_dir.join("outputs.tf"), outputs_tf())?;

    Ok(module_dir)
}

fn facets_yaml(options: &ScaffoldOptions) -> String {
    format!(
        r#"intent: {intent}
flavor: {flavor}
version: "{version}"
description: {description}
clouds:
  - {cloud}
spec:
  title: {title}
  type: object
  properties: {{}}
outputs:
  default:
    type: "@outputs/{intent}"
sample:
  kind: {intent}
  flavor: {flavor}
  version: "{version}"
  disabled: true
  spec: {{}}
"#,
        intent = options.intent,
        flavor = options.flavor,
        version = INITIAL_VERSION,
        description = options.description,
        cloud = options.cloud,
        title = options.title,
    )
}

fn main_tf(options: &ScaffoldOptions) -> String {
    format!(
        r#"# Resources for the {intent}/{flavor} module are declared here.
# Derive resource names from var.instance_name to keep them unique
# per deployment.
"#,
        intent = options.intent,
        flavor = options.flavor,
    )
}

fn variables_tf(options: &ScaffoldOptions) -> String {
    format!(
        r#"variable "instance" {{
  description = "{description}"
  type = object({{
    kind    = string
    flavor  = string
    version = string
    spec    = object({{}})
  }})
}}

variable "instance_name" {{
  description = "The architectural name of the deployed module instance."
  type        = string
}}

variable "environment" {{
  description = "The environment the instance is deployed into."
  type        = any
}}

variable "inputs" {{
  description = "A map of inputs requested by the module developer."
  type        = object({{}})
}}
"#,
        description = options.description,
    )
}

fn outputs_tf() -> String {
    r#"locals {
  output_attributes = {}
  output_interfaces = {}
}
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options() -> ScaffoldOptions {
        ScaffoldOptions {
            intent: "cache".to_string(),
            flavor: "redis".to_string(),
            cloud: "aws".to_string(),
            title: "Redis Cache".to_string(),
            description: "A managed Redis cache".to_string(),
        }
    }

    #[test]
    fn test_scaffold_creates_module_layout() {
        let temp = tempdir().unwrap();
        let module_dir = scaffold_module(temp.path(), &options()).unwrap();

        assert!(module_dir.ends_with("cache/redis/1.0"));
        for file in ["facets.yaml", "main.tf", "variables.tf", "outputs.tf"] {
            assert!(module_dir.join(file).is_file(), "missing {file}");
        }
    }

    #[test]
    fn test_scaffolded_manifest_loads() {
        let temp = tempdir().unwrap();
        let module_dir = scaffold_module(temp.path(), &options()).unwrap();

        let manifest = tfmod_manifest::load_manifest(&module_dir).unwrap();
        assert_eq!(manifest.intent, "cache");
        assert_eq!(manifest.flavor, "redis");
        assert_eq!(manifest.version, INITIAL_VERSION);
        assert_eq!(manifest.outputs["default"].output_type, "@outputs/cache");
    }

    #[test]
    fn test_scaffolded_variables_are_patchable() {
        let temp = tempdir().unwrap();
        let module_dir = scaffold_module(temp.path(), &options()).unwrap();

        let source = fs::read_to_string(module_dir.join("variables.tf")).unwrap();
        let entries = [("memory".to_string(), "number".to_string())]
            .into_iter()
            .collect();
        let patched =
            crate::patcher::replace_variable_block_body(&source, "instance", "spec", &entries)
                .unwrap();
        assert!(patched.contains("memory = number"));
    }

    #[test]
    fn test_scaffolded_outputs_declare_empty_tree() {
        let temp = tempdir().unwrap();
        let module_dir = scaffold_module(temp.path(), &options()).unwrap();

        let tree = crate::locals::read_output_lookup_tree(&module_dir).unwrap();
        assert_eq!(tree.out.attributes, serde_json::json!({}));
        assert_eq!(tree.out.interfaces, serde_json::json!({}));
    }
}
