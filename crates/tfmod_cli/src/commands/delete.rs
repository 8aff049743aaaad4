//! Delete command - Remove a module registration from the control plane.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfmod_manifest::load_manifest;

use super::client_for_profile;

#[derive(Args)]
pub struct DeleteArgs {
    /// Module directory whose registration should be deleted
    #[arg(default_value = ".")]
    path: PathBuf,

    /// The profile name to use
    #[arg(short, long)]
    profile: Option<String>,

    /// Also delete dependent registrations
    #[arg(long)]
    cascade: bool,

    /// Skip the interactive confirmation
    #[arg(short, long)]
    yes: bool,
}

pub async fn execute(args: DeleteArgs) -> Result<()> {
    let manifest = load_manifest(&args.path)?;
    info!(
        "Deleting registration of {}/{}/{}",
        manifest.intent, manifest.flavor, manifest.version
    );

    if !args.yes
        && !confirm(&format!(
            "Delete module {}/{}/{}{}? [y/N] ",
            manifest.intent,
            manifest.flavor,
            manifest.version,
            if args.cascade { " and its dependents" } else { "" }
        ))?
    {
        println!("❌ Deletion aborted.");
        return Ok(());
    }

    let (_, client) = client_for_profile(args.profile.as_deref())?;
    client.verify_login().await?;

    let module_id = client
        .find_module_id(&manifest.intent, &manifest.flavor, &manifest.version, args.cascade)
        .await?;
    client.delete_module(module_id).await?;

    println!(
        "✅ Module {}/{}/{} deleted.",
        manifest.intent, manifest.flavor, manifest.version
    );
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
