//! Get-output-tree command - Render the module's output lookup tree.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfmod_lookup::{to_lookup_shape, LookupTree};
use tfmod_tf::read_output_lookup_tree;

/// File the rendered lookup tree is written to inside the module directory.
const LOOKUP_TREE_FILE: &str = "output-lookup-tree.json";

#[derive(Args)]
pub struct GetOutputTreeArgs {
    /// Module directory containing outputs.tf or output.tf
    #[arg(default_value = ".")]
    path: PathBuf,
}

pub async fn execute(args: GetOutputTreeArgs) -> Result<()> {
    info!("Deriving output lookup tree for {:?}", args.path);

    let typed = read_output_lookup_tree(&args.path)?;
    let shaped = LookupTree::new(
        to_lookup_shape(&typed.out.attributes),
        to_lookup_shape(&typed.out.interfaces),
    );

    let target = args.path.join(LOOKUP_TREE_FILE);
    fs::write(&target, serde_json::to_string_pretty(&shaped)?)?;
    println!("✅ Output lookup tree written to {}.", target.display());
    Ok(())
}
