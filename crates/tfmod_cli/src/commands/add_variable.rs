//! Add-variable command - Insert a spec variable at a dot-separated path.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tfmod_manifest::{insert_at_path, load_manifest, save_manifest, Leaf, SchemaNode};
use tfmod_tf::{patcher, runner, TfError};

#[derive(Args)]
pub struct AddVariableArgs {
    /// Module directory containing facets.yaml and variables.tf
    path: PathBuf,

    /// Variable name, dot-separated for nesting; use * for dynamic keys
    #[arg(short, long)]
    name: String,

    /// Base JSON schema type (string, number, integer, boolean, object, enum)
    #[arg(short = 't', long = "type")]
    type_name: String,

    /// Description of the variable
    #[arg(short, long)]
    description: String,

    /// Title shown for the variable
    #[arg(long)]
    title: Option<String>,

    /// Comma-separated values, required for enum type
    #[arg(long, default_value = "")]
    options: String,

    /// Mark the variable as required
    #[arg(long)]
    required: bool,

    /// Default value for the variable
    #[arg(long)]
    default: Option<String>,
}

pub async fn execute(args: AddVariableArgs) -> Result<()> {
    info!("Adding variable '{}' to {:?}", args.name, args.path);

    let options: Vec<String> = args
        .options
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    let leaf = Leaf::from_user_input(
        &args.type_name,
        &args.description,
        args.title.as_deref(),
        &options,
        args.default.as_deref(),
    )?;

    let mut manifest = load_manifest(&args.path)?;
    insert_at_path(
        &mut manifest.spec,
        &args.name,
        SchemaNode::Leaf(leaf),
        args.required,
    )?;
    save_manifest(&args.path, &manifest)?;

    patch_variables_tf(&args, &manifest.spec).await?;

    println!(
        "✅ Variable '{}' of type '{}' added with description '{}' in path '{}'.",
        args.name,
        args.type_name,
        args.description,
        args.path.display()
    );
    Ok(())
}

/// Mirror the updated spec tree into variables.tf.
async fn patch_variables_tf(args: &AddVariableArgs, spec: &SchemaNode) -> Result<()> {
    let variables_tf = args.path.join("variables.tf");
    if !variables_tf.is_file() {
        return Err(TfError::FileMissing(variables_tf).into());
    }

    let source = fs::read_to_string(&variables_tf)?;
    let entries = patcher::spec_type_entries(spec);
    let patched = patcher::replace_variable_block_body(&source, "instance", "spec", &entries)
        .context("could not update variables.tf")?;
    fs::write(&variables_tf, patched)?;

    // formatting is best effort; the patch itself already succeeded
    runner::terraform_fmt(&args.path).await;
    Ok(())
}
