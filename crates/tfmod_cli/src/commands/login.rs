//! Login command - Verify and store control-plane credentials.

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfmod_registry::{normalize_url, store_credentials, Credentials, RegistryClient};

#[derive(Args)]
pub struct LoginArgs {
    /// Profile name to store the credentials under
    #[arg(short, long, default_value = "default")]
    profile: String,

    /// Control plane URL, e.g. https://cp.example.com
    #[arg(short, long = "control-plane-url")]
    control_plane_url: String,

    /// Username to authenticate with
    #[arg(short, long)]
    username: String,

    /// Access token to authenticate with
    #[arg(short, long)]
    token: String,
}

pub async fn execute(args: LoginArgs) -> Result<()> {
    let credentials = Credentials {
        control_plane_url: normalize_url(&args.control_plane_url)?,
        username: args.username,
        token: args.token,
    };

    info!(
        "Verifying credentials for {} against {}",
        credentials.username, credentials.control_plane_url
    );
    let client = RegistryClient::new(&credentials)?;
    client.verify_login().await?;
    println!("✔ Authenticated against {}.", credentials.control_plane_url);

    store_credentials(&args.profile, &credentials)?;
    println!("✔ Credentials stored under profile '{}'.", args.profile);
    Ok(())
}
