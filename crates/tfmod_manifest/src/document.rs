//! Reading and writing the `facets.yaml` module manifest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::schema::SchemaNode;
use crate::structural;

/// File name of the module manifest inside a module directory.
pub const MANIFEST_FILE: &str = "facets.yaml";

/// The module manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub intent: String,
    pub flavor: String,
    pub version: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clouds: Vec<String>,
    pub spec: SchemaNode,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, OutputDef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, InputDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_inputs: Option<ArtifactInputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// An output the module emits, typed by an `@outputs/...` reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDef {
    #[serde(rename = "type")]
    pub output_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<BTreeMap<String, OutputProvider>>,
}

/// A Terraform provider exposed through an output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputProvider {
    pub source: String,
    pub version: String,
    pub attributes: BTreeMap<String, String>,
}

/// An input the module consumes from another module's registered output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDef {
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
}

/// Declaration of the artifact a module deploys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInputs {
    pub primary: ArtifactInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInput {
    pub attribute_path: String,
    pub artifact_type: String,
}

impl ModuleManifest {
    /// Extract the `@outputs/<name>` reference targets of all inputs.
    pub fn input_output_types(&self) -> BTreeMap<String, String> {
        self.inputs
            .iter()
            .filter_map(|(name, input)| {
                input
                    .input_type
                    .strip_prefix("@outputs/")
                    .map(|target| (name.clone(), target.to_string()))
            })
            .collect()
    }
}

/// Path of the manifest inside a module directory.
pub fn manifest_path(module_dir: &Path) -> PathBuf {
    module_dir.join(MANIFEST_FILE)
}

/// Load and structurally validate the manifest in `module_dir`.
pub fn load_manifest(module_dir: &Path) -> ManifestResult<ModuleManifest> {
    let path = manifest_path(module_dir);
    debug!("Reading manifest from {:?}", path);

    if !path.is_file() {
        return Err(ManifestError::NotFound(path));
    }

    let content = fs::read_to_string(&path)?;
    let value: Value = serde_yaml::from_str(&content)?;
    structural::check_structure(&value)?;

    let manifest: ModuleManifest = serde_yaml::from_value(value)?;
    Ok(manifest)
}

/// Serialize the manifest back to `facets.yaml` in `module_dir`.
pub fn save_manifest(module_dir: &Path, manifest: &ModuleManifest) -> ManifestResult<()> {
    let path = manifest_path(module_dir);
    debug!("Writing manifest to {:?}", path);

    let content = serde_yaml::to_string(manifest)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
intent: example-intent
flavor: example-flavor
version: "1.0"
description: An example module
clouds:
  - aws
spec:
  type: object
  properties:
    cpu:
      type: number
      title: CPU
      description: Number of CPUs
outputs:
  default:
    type: "@outputs/example-intent"
inputs:
  network:
    type: "@outputs/vpc"
    displayName: Network
    description: The network to attach to
"#;

    #[test]
    fn test_load_and_round_trip() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), SAMPLE).unwrap();

        let first = load_manifest(temp.path()).unwrap();
        assert_eq!(first.intent, "example-intent");
        assert_eq!(first.inputs["network"].input_type, "@outputs/vpc");

        save_manifest(temp.path(), &first).unwrap();
        let second = load_manifest(temp.path()).unwrap();
        assert_eq!(first.spec, second.spec);
        assert_eq!(first.inputs.len(), second.inputs.len());

        // a second save/load cycle introduces no structural drift
        save_manifest(temp.path(), &second).unwrap();
        let third = load_manifest(temp.path()).unwrap();
        assert_eq!(second.spec, third.spec);
    }

    #[test]
    fn test_missing_manifest_is_reported() {
        let temp = tempdir().unwrap();
        let err = load_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "intent: [unclosed").unwrap();
        let err = load_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Yaml(_)));
    }

    #[test]
    fn test_input_output_types() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), SAMPLE).unwrap();
        let manifest = load_manifest(temp.path()).unwrap();

        let targets = manifest.input_output_types();
        assert_eq!(targets["network"], "vpc");
    }
}
