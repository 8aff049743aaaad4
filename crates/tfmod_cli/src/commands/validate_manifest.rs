//! Validate-manifest command - Structural check of facets.yaml only.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfmod_manifest::load_manifest;

#[derive(Args)]
pub struct ValidateManifestArgs {
    /// Module directory containing facets.yaml
    #[arg(default_value = ".")]
    path: PathBuf,
}

pub async fn execute(args: ValidateManifestArgs) -> Result<()> {
    info!("Checking manifest structure at {:?}", args.path);

    let manifest = load_manifest(&args.path)?;
    println!(
        "✅ facets.yaml is structurally valid ({}/{}/{}).",
        manifest.intent, manifest.flavor, manifest.version
    );
    Ok(())
}
