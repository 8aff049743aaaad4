//! HTTP client for the control plane.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tfmod_lookup::{parse_lookup_tree, LookupResult, LookupTree};

use crate::credentials::Credentials;
use crate::error::{RegistryError, RegistryResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A registered output type served by the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredOutput {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    /// JSON-encoded lookup tree, absent for outputs registered without one.
    #[serde(rename = "lookupTree", default)]
    pub lookup_tree: Option<String>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

impl RegisteredOutput {
    /// Parse this output's lookup tree, defaulting to an empty tree.
    pub fn parsed_lookup_tree(&self) -> LookupResult<LookupTree> {
        match &self.lookup_tree {
            Some(raw) => parse_lookup_tree(raw),
            None => Ok(LookupTree::default()),
        }
    }
}

/// A module registration record as returned by the registry listing.
#[derive(Debug, Clone, Deserialize)]
struct ModuleRecord {
    id: i64,
    flavor: String,
    version: String,
    stage: String,
    #[serde(rename = "previewModuleId", default)]
    preview_module_id: Option<i64>,
    #[serde(rename = "intentDetails")]
    intent_details: IntentDetails,
}

#[derive(Debug, Clone, Deserialize)]
struct IntentDetails {
    name: String,
}

/// Registration request for previewing or publishing a module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleRegistration {
    pub intent: String,
    pub flavor: String,
    pub version: String,
    pub publishable: bool,
    #[serde(rename = "gitRepoUrl", skip_serializing_if = "Option::is_none")]
    pub git_repo_url: Option<String>,
    #[serde(rename = "gitRef", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(rename = "autoCreateIntent")]
    pub auto_create_intent: bool,
}

/// Authenticated client for one control plane.
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    token: String,
}

impl RegistryClient {
    pub fn new(credentials: &Credentials) -> RegistryResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: credentials.control_plane_url.trim_end_matches('/').to_string(),
            username: credentials.username.clone(),
            token: credentials.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verify the stored credentials against the control plane.
    pub async fn verify_login(&self) -> RegistryResult<()> {
        let url = format!("{}/api/me", self.base_url);
        debug!("Verifying credentials against {url}");
        let response = self.get(&url).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RegistryError::AuthFailed {
                url: self.base_url.clone(),
                username: self.username.clone(),
                status: response.status().as_u16(),
            })
        }
    }

    /// List every registered output type.
    pub async fn fetch_registered_outputs(&self) -> RegistryResult<Vec<RegisteredOutput>> {
        let url = format!("{}/cc-ui/v1/tf-outputs", self.base_url);
        let response = self.get(&url).await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    /// Resolve the registry id of a module registration.
    ///
    /// A PUBLISHED record wins over a PREVIEW one; the PREVIEW record
    /// contributes its preview module id.
    pub async fn find_module_id(
        &self,
        intent: &str,
        flavor: &str,
        version: &str,
        cascade: bool,
    ) -> RegistryResult<i64> {
        let mut url = format!(
            "{}/cc-ui/v1/registry/module/{intent}/{flavor}/{version}",
            self.base_url
        );
        if cascade {
            url.push_str("?cascade=true");
        }

        let response = self.get(&url).await?;
        let response = Self::expect_success(response).await?;
        let records: Vec<ModuleRecord> = response.json().await?;

        let matching: Vec<ModuleRecord> = records
            .into_iter()
            .filter(|record| {
                record.intent_details.name == intent
                    && record.flavor == flavor
                    && record.version == version
            })
            .collect();

        if let Some(published) = matching.iter().find(|record| record.stage == "PUBLISHED") {
            return Ok(published.id);
        }
        if let Some(preview_id) = matching
            .iter()
            .filter(|record| record.stage == "PREVIEW")
            .find_map(|record| record.preview_module_id)
        {
            return Ok(preview_id);
        }

        Err(RegistryError::ModuleNotFound {
            intent: intent.to_string(),
            flavor: flavor.to_string(),
            version: version.to_string(),
        })
    }

    /// Delete a module registration by id.
    pub async fn delete_module(&self, module_id: i64) -> RegistryResult<()> {
        let url = format!("{}/cc-ui/v1/modules/{module_id}", self.base_url);
        info!("Deleting module {module_id}");
        let response = self
            .http
            .delete(&url)
            .basic_auth(&self.username, Some(&self.token))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Register a module for preview or publication.
    pub async fn register_module(&self, registration: &ModuleRegistration) -> RegistryResult<()> {
        let url = format!("{}/cc-ui/v1/modules", self.base_url);
        info!(
            "Registering module {}/{}/{} (publishable: {})",
            registration.intent, registration.flavor, registration.version,
            registration.publishable
        );
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.token))
            .json(registration)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn get(&self, url: &str) -> RegistryResult<reqwest::Response> {
        Ok(self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.token))
            .send()
            .await?)
    }

    /// Turn a non-success response into a descriptive error, extracting the
    /// control plane's `message` field when present.
    async fn expect_success(response: reqwest::Response) -> RegistryResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or(body);

        Err(RegistryError::RequestFailed {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_output_lookup_tree_parsing() {
        let output = RegisteredOutput {
            name: "vpc".to_string(),
            namespace: Some("@outputs".to_string()),
            lookup_tree: Some(
                r#"{"out": {"attributes": {"cidr": {"type": "string"}}, "interfaces": {}}}"#
                    .to_string(),
            ),
            properties: None,
        };
        let tree = output.parsed_lookup_tree().unwrap();
        assert_eq!(tree.out.attributes["cidr"]["type"], "string");

        let bare = RegisteredOutput {
            name: "sqs".to_string(),
            namespace: None,
            lookup_tree: None,
            properties: None,
        };
        let tree = bare.parsed_lookup_tree().unwrap();
        assert_eq!(tree.out.attributes, serde_json::json!({}));
    }

    #[test]
    fn test_module_record_stage_selection() {
        let records = vec![
            ModuleRecord {
                id: 7,
                flavor: "postgres".to_string(),
                version: "1.0".to_string(),
                stage: "PREVIEW".to_string(),
                preview_module_id: Some(9),
                intent_details: IntentDetails {
                    name: "db".to_string(),
                },
            },
            ModuleRecord {
                id: 4,
                flavor: "postgres".to_string(),
                version: "1.0".to_string(),
                stage: "PUBLISHED".to_string(),
                preview_module_id: None,
                intent_details: IntentDetails {
                    name: "db".to_string(),
                },
            },
        ];

        // a PUBLISHED record wins even when a PREVIEW one is listed first
        let published = records.iter().find(|record| record.stage == "PUBLISHED");
        assert_eq!(published.map(|record| record.id), Some(4));
        let preview_id = records
            .iter()
            .filter(|record| record.stage == "PREVIEW")
            .find_map(|record| record.preview_module_id);
        assert_eq!(preview_id, Some(9));
    }
}
