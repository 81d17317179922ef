//! Configuration settings management
//!
//! This module handles loading configuration from an optional TOML file and
//! the process environment, in that order of precedence (environment wins).

use crate::error::{AzResolveError, Result};
use crate::utils::network::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_RESOURCE_MANAGER_ENDPOINT: &str = "AZURE_RESOURCE_MANAGER_ENDPOINT";
pub const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub const ENV_CONFIG_PATH: &str = "AZRESOLVE_CONFIG";

/// Every variable the environment credential path recognizes, in the order
/// they are reported to the user.
pub const RECOGNIZED_ENV_VARS: [&str; 4] = [
    ENV_CLIENT_ID,
    ENV_CLIENT_SECRET,
    ENV_TENANT_ID,
    ENV_SUBSCRIPTION_ID,
];

/// Public cloud endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudConfig {
    pub resource_manager_endpoint: String,
    pub authority_host: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            resource_manager_endpoint: "https://management.azure.com".to_string(),
            authority_host: "https://login.microsoftonline.com".to_string(),
        }
    }
}

impl CloudConfig {
    /// Base URL for Resource Manager requests, without a trailing slash
    pub fn resource_manager_base(&self) -> &str {
        self.resource_manager_endpoint.trim_end_matches('/')
    }

    /// OAuth scope for Resource Manager tokens
    pub fn management_scope(&self) -> String {
        format!("{}/.default", self.resource_manager_base())
    }
}

/// Service principal secret triple used by the environment credential path
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePrincipalConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<Zeroizing<String>>,
}

impl fmt::Debug for ServicePrincipalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipalConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Complete service principal settings, all three values present
pub struct ServicePrincipalSecrets<'a> {
    pub tenant_id: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl ServicePrincipalConfig {
    /// Return the secret triple, or an error naming every unset variable
    pub fn require(&self) -> Result<ServicePrincipalSecrets<'_>> {
        let client_id = non_empty(self.client_id.as_deref());
        let client_secret = non_empty(self.client_secret.as_ref().map(|s| s.as_str()));
        let tenant_id = non_empty(self.tenant_id.as_deref());

        match (client_id, client_secret, tenant_id) {
            (Some(client_id), Some(client_secret), Some(tenant_id)) => Ok(ServicePrincipalSecrets {
                tenant_id,
                client_id,
                client_secret,
            }),
            _ => {
                let missing: Vec<&str> = [
                    (ENV_CLIENT_ID, client_id.is_none()),
                    (ENV_CLIENT_SECRET, client_secret.is_none()),
                    (ENV_TENANT_ID, tenant_id.is_none()),
                ]
                .iter()
                .filter(|(_, unset)| *unset)
                .map(|(name, _)| *name)
                .collect();

                Err(AzResolveError::config(format!(
                    "azure token from environment failed, {} unset; set the environment variables {}",
                    missing.join(", "),
                    RECOGNIZED_ENV_VARS.join(", ")
                )))
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    /// Explicit subscription; when unset the first subscription the
    /// credential can see is used.
    pub subscription_id: Option<String>,
    pub cloud: CloudConfig,
    pub service_principal: ServicePrincipalConfig,
    pub network: NetworkConfig,
}

impl Config {
    /// Load configuration from the default file location and process environment
    pub async fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok()).await
    }

    /// Load configuration using `lookup` in place of the process environment
    pub async fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match lookup(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => Self::get_config_path().filter(|p| p.exists()),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path).await?,
            None => Self::default(),
        };

        config.apply_env(lookup);
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            AzResolveError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = toml::from_str::<Config>(&contents)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Override file values with environment variables that are set and non-empty
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_SUBSCRIPTION_ID) {
            self.subscription_id = Some(value);
        }
        if let Some(value) = get(ENV_TENANT_ID) {
            self.service_principal.tenant_id = Some(value);
        }
        if let Some(value) = get(ENV_CLIENT_ID) {
            self.service_principal.client_id = Some(value);
        }
        if let Some(value) = get(ENV_CLIENT_SECRET) {
            self.service_principal.client_secret = Some(Zeroizing::new(value));
        }
        if let Some(value) = get(ENV_RESOURCE_MANAGER_ENDPOINT) {
            self.cloud.resource_manager_endpoint = value;
        }
        if let Some(value) = get(ENV_AUTHORITY_HOST) {
            self.cloud.authority_host = value;
        }
    }

    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("azresolve").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("resource_manager_endpoint", &self.cloud.resource_manager_endpoint),
            ("authority_host", &self.cloud.authority_host),
        ] {
            url::Url::parse(value).map_err(|e| {
                AzResolveError::config(format!("Invalid {} '{}': {}", name, value, e))
            })?;
        }

        if let Some(subscription_id) = &self.subscription_id {
            if subscription_id.trim().is_empty() {
                return Err(AzResolveError::config("Subscription ID must not be blank"));
            }
        }

        Ok(())
    }
}
