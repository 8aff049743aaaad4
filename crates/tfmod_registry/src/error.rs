//! Error types for control-plane interaction.

use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not determine the home directory for the credentials file")]
    HomeNotFound,

    #[error("not logged in under profile '{0}'; run login first")]
    NotLoggedIn(String),

    #[error("authentication failed for '{username}' at {url} (status {status})")]
    AuthFailed {
        url: String,
        username: String,
        status: u16,
    },

    #[error("control plane URL must start with http:// or https://, got '{0}'")]
    InvalidUrl(String),

    #[error("module {intent}/{flavor}/{version} not found in the registry")]
    ModuleNotFound {
        intent: String,
        flavor: String,
        version: String,
    },

    #[error("control plane request failed (status {status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("invalid credentials file: {0}")]
    CredentialsFormat(#[from] toml::de::Error),

    #[error("could not serialize credentials: {0}")]
    CredentialsSerialize(#[from] toml::ser::Error),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
