//! Error types for lookup tree parsing and transformation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid lookup tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registered output '{0}' carries no lookup tree")]
    MissingTree(String),
}

pub type LookupResult<T> = Result<T, LookupError>;
