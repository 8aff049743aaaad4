//! Error types for module validation.

use thiserror::Error;

use crate::engine::ValidationFinding;

pub type ValidateResult<T> = Result<T, ValidateError>;

#[derive(Debug, Error)]
pub enum ValidateError {
    /// A fail-fast spec rule was violated.
    #[error("{0}")]
    Rule(ValidationFinding),

    /// The aggregating provider-block scan found offending files.
    #[error("provider blocks are not allowed in a module; found in: {}", paths.join(", "))]
    ProviderBlocks { paths: Vec<String> },

    #[error(transparent)]
    Manifest(#[from] tfmod_manifest::ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
