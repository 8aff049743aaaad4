//! Credential profiles for the control plane.
//!
//! Profiles live in a TOML file at `~/.tfmod/credentials`. The active
//! profile is resolved from an explicit flag, then the `TFMOD_PROFILE`
//! environment variable, then the stored default.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// Environment variable naming the profile to use.
pub const PROFILE_ENV: &str = "TFMOD_PROFILE";

/// Profile used when nothing else is configured.
pub const DEFAULT_PROFILE: &str = "default";

/// Credentials of one control-plane profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub control_plane_url: String,
    pub username: String,
    pub token: String,
}

/// The on-disk credentials document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsFile {
    /// Name of the profile used when none is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Credentials>,
}

/// Normalize a control plane URL to scheme + authority.
pub fn normalize_url(url: &str) -> RegistryResult<String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(RegistryError::InvalidUrl(url.to_string()));
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// Path of the credentials file.
pub fn credentials_path() -> RegistryResult<PathBuf> {
    let home = dirs::home_dir().ok_or(RegistryError::HomeNotFound)?;
    Ok(home.join(".tfmod").join("credentials"))
}

/// Load the credentials file, treating a missing file as empty.
pub fn load_credentials_file() -> RegistryResult<CredentialsFile> {
    read_credentials_file(&credentials_path()?)
}

fn read_credentials_file(path: &PathBuf) -> RegistryResult<CredentialsFile> {
    if !path.is_file() {
        return Ok(CredentialsFile::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Store `credentials` under `profile` and make it the default.
pub fn store_credentials(profile: &str, credentials: &Credentials) -> RegistryResult<()> {
    let path = credentials_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = read_credentials_file(&path)?;
    file.profiles
        .insert(profile.to_string(), credentials.clone());
    file.default = Some(profile.to_string());

    debug!("Storing credentials for profile '{profile}' at {:?}", path);
    fs::write(&path, toml::to_string_pretty(&file)?)?;
    Ok(())
}

/// Name of the profile to use for this invocation.
pub fn resolve_profile(explicit: Option<&str>) -> RegistryResult<String> {
    if let Some(profile) = explicit {
        return Ok(profile.to_string());
    }
    if let Ok(profile) = std::env::var(PROFILE_ENV) {
        if !profile.is_empty() {
            return Ok(profile);
        }
    }
    let file = load_credentials_file()?;
    Ok(file.default.unwrap_or_else(|| DEFAULT_PROFILE.to_string()))
}

/// Credentials stored under `profile`.
pub fn lookup_credentials(profile: &str) -> RegistryResult<Credentials> {
    let file = load_credentials_file()?;
    file.profiles
        .get(profile)
        .cloned()
        .ok_or_else(|| RegistryError::NotLoggedIn(profile.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_file_round_trip() {
        let mut file = CredentialsFile::default();
        file.profiles.insert(
            "staging".to_string(),
            Credentials {
                control_plane_url: "https://cp.example.com".to_string(),
                username: "dev".to_string(),
                token: "secret".to_string(),
            },
        );
        file.default = Some("staging".to_string());

        let serialized = toml::to_string_pretty(&file).unwrap();
        let reparsed: CredentialsFile = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.default.as_deref(), Some("staging"));
        assert_eq!(
            reparsed.profiles["staging"].control_plane_url,
            "https://cp.example.com"
        );
    }

    #[test]
    fn test_missing_file_parses_as_empty() {
        let parsed: CredentialsFile = toml::from_str("").unwrap();
        assert!(parsed.profiles.is_empty());
        assert!(parsed.default.is_none());
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://cp.example.com/").unwrap(),
            "https://cp.example.com"
        );
        assert!(normalize_url("cp.example.com").is_err());
    }
}
