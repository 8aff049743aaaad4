//! Error types for manifest operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while loading, mutating or saving a module manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("facets.yaml not found at {0}")]
    NotFound(PathBuf),

    #[error("facets.yaml is not a valid YAML file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("facets.yaml does not follow the manifest schema: {0}")]
    Structural(String),

    #[error("{path} already has {existing} defined; cannot add {requested} at the same level")]
    ShapeConflict {
        path: String,
        existing: &'static str,
        requested: &'static str,
    },

    #[error("a schema node cannot declare both properties and patternProperties")]
    MixedShape,

    #[error("patternProperties must contain exactly one pattern entry")]
    PatternEntryCount,

    #[error("variable path must not end with the '*' wildcard")]
    WildcardTerminal,

    #[error("invalid variable path '{0}': segments must be non-empty")]
    InvalidPath(String),

    #[error("cannot descend into '{path}': an existing {found} value is in the way")]
    PathCollision { path: String, found: String },

    #[error("invalid default for type '{expected}': {message}")]
    InvalidDefault { expected: String, message: String },

    #[error("type '{given}' is not allowed; must be one of: {allowed}")]
    DisallowedType { given: String, allowed: String },

    #[error("options must be specified for enum type")]
    MissingEnumOptions,
}
