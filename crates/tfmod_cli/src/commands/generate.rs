//! Generate command - Scaffold a new module.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfmod_tf::{scaffold_module, ScaffoldOptions};

#[derive(Args)]
pub struct GenerateArgs {
    /// Directory to generate the module under
    #[arg(default_value = ".")]
    path: PathBuf,

    /// The intent of the module
    #[arg(short, long)]
    intent: String,

    /// The flavor of the module
    #[arg(short, long)]
    flavor: String,

    /// The cloud provider for the module
    #[arg(short, long)]
    cloud: String,

    /// The title of the module
    #[arg(short, long)]
    title: String,

    /// The description of the module
    #[arg(short, long)]
    description: String,
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    info!("Generating module {}/{}", args.intent, args.flavor);

    let options = ScaffoldOptions {
        intent: args.intent,
        flavor: args.flavor,
        cloud: args.cloud,
        title: args.title,
        description: args.description,
    };
    let module_dir = scaffold_module(&args.path, &options)?;

    println!("✅ Module generated at: {}", module_dir.display());
    Ok(())
}
