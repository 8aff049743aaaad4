//! Preview command - Validate a module and register it with the control
//! plane, optionally as publishable.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use tfmod_registry::ModuleRegistration;
use tfmod_tf::runner;
use tfmod_validate::validate_module;

use super::client_for_profile;

#[derive(Args)]
pub struct PreviewArgs {
    /// Module directory to register
    #[arg(default_value = ".")]
    path: PathBuf,

    /// The profile name to use
    #[arg(short, long)]
    profile: Option<String>,

    /// Create the intent in the control plane when it does not exist
    #[arg(long = "auto-create-intent")]
    auto_create_intent: bool,

    /// Register as publishable instead of preview-only
    #[arg(long)]
    publishable: bool,

    /// Git repository URL recorded with the registration
    #[arg(long = "git-repo-url", env = "GIT_REPO_URL")]
    git_repo_url: Option<String>,

    /// Git ref recorded with the registration
    #[arg(long = "git-ref", env = "GIT_REF")]
    git_ref: Option<String>,
}

pub async fn execute(args: PreviewArgs) -> Result<()> {
    info!("Previewing module at {:?}", args.path);

    let manifest = validate_module(&args.path)?;
    println!(
        "✅ Validation passed for {}/{}/{}.",
        manifest.intent, manifest.flavor, manifest.version
    );

    if runner::terraform_available().await {
        runner::terraform_fmt(&args.path).await;
        runner::terraform_init(&args.path).await?;
        runner::terraform_validate(&args.path).await?;
        println!("✅ Terraform checks passed.");
    } else {
        warn!("terraform not found on PATH, skipping terraform checks");
    }

    let (_, client) = client_for_profile(args.profile.as_deref())?;
    client.verify_login().await?;

    let registration = ModuleRegistration {
        intent: manifest.intent.clone(),
        flavor: manifest.flavor.clone(),
        version: manifest.version.clone(),
        publishable: args.publishable,
        git_repo_url: args.git_repo_url,
        git_ref: args.git_ref.or_else(|| Some("local".to_string())),
        auto_create_intent: args.auto_create_intent,
    };
    client.register_module(&registration).await?;

    println!(
        "✅ Module {}/{}/{} registered{}.",
        manifest.intent,
        manifest.flavor,
        manifest.version,
        if args.publishable {
            " as publishable"
        } else {
            " for preview"
        }
    );
    Ok(())
}
