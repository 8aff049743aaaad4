//! Execution of the local `terraform` binary.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{TfError, TfResult};

/// Upper bound on a single terraform invocation.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Result of a terraform invocation.
#[derive(Debug)]
pub struct TerraformOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Check that terraform is installed and on PATH.
pub async fn terraform_available() -> bool {
    Command::new("terraform")
        .arg("version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run `terraform fmt` on a module directory. Formatting is best effort:
/// failures are logged and swallowed so a successful patch is never undone
/// by a formatter problem.
pub async fn terraform_fmt(module_dir: &Path) {
    debug!("Running terraform fmt in {:?}", module_dir);
    match run_terraform(module_dir, &["fmt"]).await {
        Ok(output) if output.success => {}
        Ok(output) => warn!("terraform fmt reported a problem: {}", output.stderr.trim()),
        Err(error) => warn!("terraform fmt could not be run: {error}"),
    }
}

/// Run `terraform fmt -check`, failing when files are not formatted.
pub async fn terraform_fmt_check(module_dir: &Path) -> TfResult<()> {
    expect_success(module_dir, &["fmt", "-check"], "fmt").await
}

/// Run `terraform init -backend=false`.
pub async fn terraform_init(module_dir: &Path) -> TfResult<()> {
    info!("Running terraform init in {:?}", module_dir);
    expect_success(module_dir, &["init", "-backend=false", "-input=false"], "init").await
}

/// Run `terraform validate`.
pub async fn terraform_validate(module_dir: &Path) -> TfResult<()> {
    info!("Running terraform validate in {:?}", module_dir);
    expect_success(module_dir, &["validate", "-no-color"], "validate").await
}

async fn expect_success(module_dir: &Path, args: &[&str], command: &str) -> TfResult<()> {
    let output = run_terraform(module_dir, args).await?;
    if output.success {
        Ok(())
    } else {
        let message = if output.stderr.trim().is_empty() {
            output.stdout.trim().to_string()
        } else {
            output.stderr.trim().to_string()
        };
        Err(TfError::TerraformFailed {
            command: command.to_string(),
            message,
        })
    }
}

async fn run_terraform(module_dir: &Path, args: &[&str]) -> TfResult<TerraformOutput> {
    let invocation = Command::new("terraform")
        .args(args)
        .current_dir(module_dir)
        .output();

    let output = timeout(COMMAND_TIMEOUT, invocation)
        .await
        .map_err(|_| TfError::TerraformTimeout {
            command: args.first().copied().unwrap_or_default().to_string(),
            seconds: COMMAND_TIMEOUT.as_secs(),
        })?
        .map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                TfError::TerraformNotAvailable
            } else {
                TfError::Io(error)
            }
        })?;

    Ok(TerraformOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
