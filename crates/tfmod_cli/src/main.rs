//! tfmod CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 5: Terraform error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TERRAFORM_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "tfmod=debug"
    } else if cli.quiet {
        "tfmod=error"
    } else {
        "tfmod=info"
    };

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive(default_level.parse().expect("static directive"))
                .add_directive("warn".parse().expect("static directive")),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::AddVariable(args) => commands::add_variable::execute(args).await,
        Commands::AddInput(args) => commands::add_input::execute(args).await,
        Commands::GetOutputs(args) => commands::get_outputs::execute(args).await,
        Commands::GetOutputTree(args) => commands::get_output_tree::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::ValidateManifest(args) => commands::validate_manifest::execute(args).await,
        Commands::Login(args) => commands::login::execute(args).await,
        Commands::Preview(args) => commands::preview::execute(args).await,
        Commands::Delete(args) => commands::delete::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    let msg = e.to_string().to_lowercase();

    if msg.contains("validation")
        || msg.contains("provider blocks")
        || msg.contains("missing for property")
        || msg.contains("invalid array type")
        || msg.contains("mutually exclusive")
    {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("terraform") {
        ExitCodes::TERRAFORM_ERROR
    } else if msg.contains("not allowed")
        || msg.contains("not found")
        || msg.contains("usage")
        || msg.contains("must be")
    {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
