//! CLI command definitions.
//!
//! Each subcommand maps one step of the module authoring workflow onto the
//! core crates: manifest mutation, Terraform patching, validation and the
//! control-plane client.

use anyhow::Result;
use clap::{Parser, Subcommand};

use tfmod_registry::{lookup_credentials, resolve_profile, RegistryClient};

pub mod add_input;
pub mod add_variable;
pub mod delete;
pub mod generate;
pub mod get_output_tree;
pub mod get_outputs;
pub mod login;
pub mod preview;
pub mod validate;
pub mod validate_manifest;

/// tfmod - Terraform module authoring CLI
#[derive(Parser)]
#[command(name = "tfmod")]
#[command(version, about = "tfmod - author, validate and publish Terraform modules")]
#[command(long_about = r#"
tfmod manages modules described by a facets.yaml manifest: it scaffolds the
module layout, keeps the manifest's spec tree and variables.tf in sync, wires
inputs to registered outputs, and gates publishing behind validation.

WORKFLOWS:
  generate          → Scaffold a new module directory
  add-variable      → Add a spec variable at a dot-separated path
  add-input         → Wire a registered output in as a module input
  get-outputs       → List output types registered in the control plane
  get-output-tree   → Render the module's output lookup tree
  validate          → Run manifest, spec and provider-block validation
  validate-manifest → Check only the manifest's structure
  login             → Store control-plane credentials under a profile
  preview           → Validate and register the module
  delete            → Delete the module's registration

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  5 - Terraform error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold a new module directory
    Generate(generate::GenerateArgs),

    /// Add a spec variable at a dot-separated path
    #[command(name = "add-variable")]
    AddVariable(add_variable::AddVariableArgs),

    /// Add a registered output as a module input
    #[command(name = "add-input")]
    AddInput(add_input::AddInputArgs),

    /// List registered output types
    #[command(name = "get-outputs")]
    GetOutputs(get_outputs::GetOutputsArgs),

    /// Render and persist the module's output lookup tree
    #[command(name = "get-output-tree")]
    GetOutputTree(get_output_tree::GetOutputTreeArgs),

    /// Validate the module directory
    Validate(validate::ValidateArgs),

    /// Validate only the manifest's structure
    #[command(name = "validate-manifest")]
    ValidateManifest(validate_manifest::ValidateManifestArgs),

    /// Store control-plane credentials under a named profile
    Login(login::LoginArgs),

    /// Validate and register the module with the control plane
    Preview(preview::PreviewArgs),

    /// Delete the module's registration from the control plane
    Delete(delete::DeleteArgs),
}

/// Resolve the active profile and build an authenticated client from it.
pub(crate) fn client_for_profile(explicit: Option<&str>) -> Result<(String, RegistryClient)> {
    let profile = resolve_profile(explicit)?;
    println!("Profile selected: {profile}");
    let credentials = lookup_credentials(&profile)?;
    let client = RegistryClient::new(&credentials)?;
    Ok((profile, client))
}
