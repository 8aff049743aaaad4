//! Validate command - Manifest, spec and provider-block validation, with
//! optional terraform checks.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfmod_tf::runner;
use tfmod_validate::validate_module;

#[derive(Args)]
pub struct ValidateArgs {
    /// Module directory to validate
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Also run terraform fmt, init and validate
    #[arg(long = "with-terraform")]
    with_terraform: bool,

    /// Check formatting instead of rewriting files
    #[arg(long = "check-only")]
    check_only: bool,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating module at {:?}", args.path);

    let manifest = validate_module(&args.path)?;
    println!(
        "✅ Manifest and spec checks passed for {}/{}/{}.",
        manifest.intent, manifest.flavor, manifest.version
    );

    if !args.with_terraform {
        return Ok(());
    }

    if args.check_only {
        runner::terraform_fmt_check(&args.path).await?;
        println!("✅ terraform fmt -check passed.");
    } else {
        runner::terraform_fmt(&args.path).await;
        println!("✅ terraform fmt applied.");
    }

    runner::terraform_init(&args.path).await?;
    println!("✅ terraform init succeeded.");

    runner::terraform_validate(&args.path).await?;
    println!("✅ terraform validate succeeded.");
    Ok(())
}
