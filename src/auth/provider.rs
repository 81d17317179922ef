//! Authentication provider trait and implementations
//!
//! This module defines the authentication provider trait and the three
//! token sources the resolver works with: the local Azure CLI session, a
//! service principal secret, and a caller-supplied bearer token.

use async_trait::async_trait;
use azure_core::auth::{AccessToken, TokenCredential};
use azure_identity::{AzureCliCredential, ClientSecretCredential};
use std::sync::Arc;
use time::OffsetDateTime;
use url::Url;
use zeroize::Zeroizing;

use crate::error::{AzResolveError, Result};

/// Trait for Azure authentication providers
#[async_trait]
pub trait AzureAuthProvider: Send + Sync {
    /// Get an access token for the specified scopes
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;

    /// Short human-readable name of the token source, used in logs
    fn name(&self) -> &'static str;
}

/// Interactive provider backed by the local `az login` session
pub struct CliSessionProvider {
    credential: Arc<AzureCliCredential>,
}

impl CliSessionProvider {
    pub fn new() -> Self {
        Self {
            credential: Arc::new(AzureCliCredential::new()),
        }
    }
}

impl Default for CliSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AzureAuthProvider for CliSessionProvider {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        self.credential.get_token(scopes).await.map_err(|e| {
            AzResolveError::authentication(format!("Azure CLI token request failed: {}", e))
        })
    }

    fn name(&self) -> &'static str {
        "azure-cli"
    }
}

/// Client Secret Authentication Provider
pub struct ServicePrincipalProvider {
    credential: Arc<ClientSecretCredential>,
    client_id: String,
}

impl ServicePrincipalProvider {
    /// Create a new ServicePrincipalProvider against `authority_host`
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self> {
        let authority_url = Url::parse(authority_host)
            .map_err(|e| AzResolveError::config(format!("Invalid authority URL: {}", e)))?;

        let http_client = Arc::new(reqwest::Client::new());
        let credential = Arc::new(ClientSecretCredential::new(
            http_client,
            authority_url,
            tenant_id.to_string(),
            client_id.to_string(),
            client_secret.to_string(),
        ));

        Ok(Self {
            credential,
            client_id: client_id.to_string(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[async_trait]
impl AzureAuthProvider for ServicePrincipalProvider {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        self.credential.get_token(scopes).await.map_err(|e| {
            AzResolveError::authentication(format!(
                "Service principal '{}' token request failed: {}",
                self.client_id, e
            ))
        })
    }

    fn name(&self) -> &'static str {
        "service-principal"
    }
}

/// Provider that hands out a bearer token obtained elsewhere
pub struct StaticTokenProvider {
    token: Zeroizing<String>,
    expires_on: OffsetDateTime,
}

impl StaticTokenProvider {
    /// Wrap an opaque bearer token. The expiry is unknown, so an hour from
    /// now is reported to callers that inspect it.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
            expires_on: OffsetDateTime::now_utc() + time::Duration::hours(1),
        }
    }

    pub fn with_expiry<S: Into<String>>(token: S, expires_on: OffsetDateTime) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
            expires_on,
        }
    }
}

#[async_trait]
impl AzureAuthProvider for StaticTokenProvider {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
        if self.token.is_empty() {
            return Err(AzResolveError::authentication("Bearer token is empty"));
        }
        Ok(AccessToken::new(self.token.as_str().to_string(), self.expires_on))
    }

    fn name(&self) -> &'static str {
        "static-token"
    }
}
