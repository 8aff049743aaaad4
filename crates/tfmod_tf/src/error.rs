//! Error types for Terraform source manipulation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Terraform operations.
pub type TfResult<T> = Result<T, TfError>;

/// Errors that can occur while patching, parsing or running Terraform.
#[derive(Error, Debug)]
pub enum TfError {
    #[error("variable '{0}' not found in the Terraform file")]
    VariableNotFound(String),

    #[error("'{keyword}' block not found in variable '{variable}'")]
    BlockNotFound { variable: String, keyword: String },

    #[error("unbalanced braces in block starting at line {0}")]
    UnbalancedBlock(usize),

    #[error("no locals block declaring '{0}' was found")]
    LocalsNotFound(String),

    #[error("failed to parse Terraform expression: {0}")]
    Parse(String),

    #[error("required file missing: {0}")]
    FileMissing(PathBuf),

    #[error("terraform is not installed or not on PATH")]
    TerraformNotAvailable,

    #[error("terraform {command} failed: {message}")]
    TerraformFailed { command: String, message: String },

    #[error("terraform {command} timed out after {seconds}s")]
    TerraformTimeout { command: String, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
