//! # tfmod_validate
//!
//! The validation rules a module must pass before it can be published:
//! spec tree rules (array ban, pattern shapes, UI hint conflicts, required
//! documentation) and the module-wide provider-block scan. The manifest's
//! outer structural check runs as part of loading, before any rule here.

pub mod engine;
pub mod error;
pub mod provider;

use std::path::Path;

use tfmod_manifest::{load_manifest, ModuleManifest};
use tracing::info;

pub use engine::{validate_spec, Rule, ValidationFinding};
pub use error::{ValidateError, ValidateResult};
pub use provider::scan_provider_blocks;

/// Load and fully validate the module at `module_dir`.
///
/// Runs the structural manifest check, the spec rules, and the
/// provider-block scan, returning the manifest on success.
pub fn validate_module(module_dir: &Path) -> ValidateResult<ModuleManifest> {
    info!("Validating module at {:?}", module_dir);
    let manifest = load_manifest(module_dir)?;
    validate_spec(&manifest.spec)?;
    scan_provider_blocks(module_dir)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"
intent: db
flavor: postgres
version: "1.0"
description: A database
spec:
  type: object
  properties:
    cpu:
      title: CPU
      description: Number of CPUs
      type: number
"#;

    #[test]
    fn test_valid_module_passes() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("facets.yaml"), MANIFEST).unwrap();
        fs::write(temp.path().join("main.tf"), "# empty\n").unwrap();

        let manifest = validate_module(temp.path()).unwrap();
        assert_eq!(manifest.intent, "db");
    }

    #[test]
    fn test_provider_block_fails_module() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("facets.yaml"), MANIFEST).unwrap();
        fs::write(temp.path().join("main.tf"), "provider \"aws\" {}\n").unwrap();

        assert!(matches!(
            validate_module(temp.path()),
            Err(ValidateError::ProviderBlocks { .. })
        ));
    }

    #[test]
    fn test_structural_failure_precedes_spec_rules() {
        let temp = tempdir().unwrap();
        // missing required manifest keys, and an array in the spec: the
        // structural check must win
        fs::write(
            temp.path().join("facets.yaml"),
            "intent: db\nspec:\n  type: object\n  properties:\n    bad:\n      type: array\n",
        )
        .unwrap();

        assert!(matches!(
            validate_module(temp.path()),
            Err(ValidateError::Manifest(_))
        ));
    }
}
