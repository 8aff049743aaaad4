//! Add-input command - Wire a registered output in as a module input.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use tfmod_lookup::{to_terraform_type, LookupSections};
use tfmod_manifest::{load_manifest, save_manifest, InputDef};
use tfmod_registry::RegisteredOutput;
use tfmod_tf::{patcher, runner, TfError};

use super::client_for_profile;

#[derive(Args)]
pub struct AddInputArgs {
    /// Module directory containing facets.yaml and variables.tf
    path: PathBuf,

    /// The profile name to use
    #[arg(short, long)]
    profile: Option<String>,

    /// Name of the input variable
    #[arg(short, long)]
    name: String,

    /// Display name of the input
    #[arg(long = "display-name")]
    display_name: String,

    /// Description of the input
    #[arg(short, long)]
    description: String,

    /// Registered output type to consume, e.g. vpc
    #[arg(short, long = "output-type")]
    output_type: String,
}

pub async fn execute(args: AddInputArgs) -> Result<()> {
    info!("Adding input '{}' to {:?}", args.name, args.path);

    let variables_tf = args.path.join("variables.tf");
    if !variables_tf.is_file() {
        return Err(TfError::FileMissing(variables_tf).into());
    }

    let mut manifest = load_manifest(&args.path)?;
    if manifest.inputs.contains_key(&args.name) {
        println!(
            "⚠️ Input {} already exists in facets.yaml. It will be overwritten.",
            args.name
        );
    }

    manifest.inputs.insert(
        args.name.clone(),
        InputDef {
            input_type: format!("@outputs/{}", args.output_type),
            display_name: Some(args.display_name.clone()),
            description: Some(args.description.clone()),
            providers: None,
        },
    );

    let (_, client) = client_for_profile(args.profile.as_deref())?;
    client.verify_login().await?;

    let registered = client.fetch_registered_outputs().await?;
    let by_name: BTreeMap<&str, &RegisteredOutput> = registered
        .iter()
        .map(|output| (output.name.as_str(), output))
        .collect();

    // every input of the manifest must reference a registered output
    let mut sections = BTreeMap::new();
    for (input_name, target) in manifest.input_output_types() {
        let Some(output) = by_name.get(target.as_str()) else {
            let available: Vec<&str> = by_name.keys().copied().collect();
            bail!(
                "{target} not found in registered outputs. Please select a valid output \
                 type from {available:?}."
            );
        };
        sections.insert(input_name, output.parsed_lookup_tree()?.out);
    }

    let block = render_inputs_variable(&sections);
    let source = fs::read_to_string(&variables_tf)?;
    let patched = patcher::replace_or_append_variable_block(&source, "inputs", &block)?;
    fs::write(&variables_tf, patched)?;
    runner::terraform_fmt(&args.path).await;
    println!("✅ Input added to {}.", variables_tf.display());

    save_manifest(&args.path, &manifest)?;
    println!("✅ Input added to facets.yaml.");
    Ok(())
}

/// Render the whole `variable "inputs"` block from the lookup trees of the
/// wired outputs.
fn render_inputs_variable(sections: &BTreeMap<String, LookupSections>) -> String {
    let mut body = String::new();
    for (name, section) in sections {
        body.push_str(&format!(
            "    {name} = object({{\n      attributes = {}\n      interfaces = {}\n    }})\n",
            to_terraform_type(&section.attributes, 3),
            to_terraform_type(&section.interfaces, 3),
        ));
    }

    format!(
        "variable \"inputs\" {{\n  description = \"A map of inputs requested by the module developer.\"\n  type = object({{\n{body}  }})\n}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_inputs_variable() {
        let mut sections = BTreeMap::new();
        sections.insert(
            "network".to_string(),
            LookupSections {
                attributes: json!({"cidr": {"type": "string"}}),
                interfaces: json!({}),
            },
        );

        let block = render_inputs_variable(&sections);
        assert!(block.starts_with("variable \"inputs\" {"));
        assert!(block.contains("network = object({"));
        assert!(block.contains("cidr = string"));
        assert!(block.contains("interfaces = object({})"));
    }
}
