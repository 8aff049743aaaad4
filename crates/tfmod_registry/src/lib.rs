//! # tfmod_registry
//!
//! The control-plane collaborator: named credential profiles stored in
//! `~/.tfmod/credentials` and an authenticated HTTP client for registered
//! outputs and module registrations. Failures surface directly; there is
//! no retry layer.

pub mod client;
pub mod credentials;
pub mod error;

pub use client::{ModuleRegistration, RegisteredOutput, RegistryClient};
pub use credentials::{
    credentials_path, load_credentials_file, lookup_credentials, normalize_url, resolve_profile,
    store_credentials, Credentials, CredentialsFile, DEFAULT_PROFILE, PROFILE_ENV,
};
pub use error::{RegistryError, RegistryResult};
