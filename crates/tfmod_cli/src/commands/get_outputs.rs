//! Get-outputs command - List registered output types.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::client_for_profile;

#[derive(Args)]
pub struct GetOutputsArgs {
    /// The profile name to use
    #[arg(short, long)]
    profile: Option<String>,
}

pub async fn execute(args: GetOutputsArgs) -> Result<()> {
    let (_, client) = client_for_profile(args.profile.as_deref())?;
    client.verify_login().await?;

    info!("Fetching registered outputs from {}", client.base_url());
    let outputs = client.fetch_registered_outputs().await?;

    if outputs.is_empty() {
        println!("No outputs registered.");
        return Ok(());
    }

    let mut names: Vec<&str> = outputs.iter().map(|output| output.name.as_str()).collect();
    names.sort_unstable();
    for name in names {
        println!("- {name}");
    }
    Ok(())
}
