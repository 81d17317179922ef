//! Credential resolution
//!
//! Tries the interactive Azure CLI session first and falls back to service
//! principal credentials from the environment. Exactly one fallback, no
//! retries, nothing cached between calls.

use azure_core::auth::AccessToken;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::provider::{
    AzureAuthProvider, CliSessionProvider, ServicePrincipalProvider, StaticTokenProvider,
};
use crate::config::{Config, ServicePrincipalConfig};
use crate::error::{AzResolveError, Result};

/// Where a resolved credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    CliSession,
    ServicePrincipal,
    StaticToken,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::CliSession => write!(f, "Azure CLI session"),
            CredentialSource::ServicePrincipal => write!(f, "service principal"),
            CredentialSource::StaticToken => write!(f, "bearer token"),
        }
    }
}

/// An authenticated identity, valid for one top-level operation
#[derive(Clone)]
pub struct Credential {
    provider: Arc<dyn AzureAuthProvider>,
    source: CredentialSource,
}

impl Credential {
    pub fn new(provider: Arc<dyn AzureAuthProvider>, source: CredentialSource) -> Self {
        Self { provider, source }
    }

    /// Credential wrapping an opaque bearer token
    pub fn from_bearer_token<S: Into<String>>(token: S) -> Self {
        Self::new(
            Arc::new(StaticTokenProvider::new(token)),
            CredentialSource::StaticToken,
        )
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Fetch a bearer token for `scope`
    pub async fn bearer_token(&self, scope: &str) -> Result<String> {
        let token = self.provider.get_token(&[scope]).await?;
        Ok(token.token.secret().to_string())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider.name())
            .field("source", &self.source)
            .finish()
    }
}

/// Builds the second-chance credential once the interactive path has failed
#[cfg_attr(test, mockall::automock)]
pub trait FallbackCredential: Send + Sync {
    fn build(&self) -> Result<Arc<dyn AzureAuthProvider>>;
}

/// Service principal credential read from `AZURE_CLIENT_ID`,
/// `AZURE_CLIENT_SECRET` and `AZURE_TENANT_ID`
pub struct EnvironmentFallback {
    authority_host: String,
    service_principal: ServicePrincipalConfig,
}

impl EnvironmentFallback {
    pub fn new(authority_host: String, service_principal: ServicePrincipalConfig) -> Self {
        Self {
            authority_host,
            service_principal,
        }
    }
}

impl FallbackCredential for EnvironmentFallback {
    fn build(&self) -> Result<Arc<dyn AzureAuthProvider>> {
        let secrets = self.service_principal.require()?;
        let provider = ServicePrincipalProvider::new(
            &self.authority_host,
            secrets.tenant_id,
            secrets.client_id,
            secrets.client_secret,
        )?;
        Ok(Arc::new(provider))
    }
}

/// Two-tier credential resolver
pub struct CredentialResolver {
    scope: String,
    interactive: Arc<dyn AzureAuthProvider>,
    fallback: Box<dyn FallbackCredential>,
}

impl CredentialResolver {
    pub fn new(
        scope: String,
        interactive: Arc<dyn AzureAuthProvider>,
        fallback: Box<dyn FallbackCredential>,
    ) -> Self {
        Self {
            scope,
            interactive,
            fallback,
        }
    }

    /// Resolver for Resource Manager using the Azure CLI session and the
    /// configured service principal
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cloud.management_scope(),
            Arc::new(CliSessionProvider::new()),
            Box::new(EnvironmentFallback::new(
                config.cloud.authority_host.clone(),
                config.service_principal.clone(),
            )),
        )
    }

    /// Obtain an authenticated credential
    pub async fn resolve(&self) -> Result<Credential> {
        let (credential, _) = self.resolve_with_token().await?;
        Ok(credential)
    }

    /// Obtain a raw bearer token through the same two-tier chain
    pub async fn resolve_bearer_token(&self) -> Result<String> {
        let (_, token) = self.resolve_with_token().await?;
        Ok(token.token.secret().to_string())
    }

    async fn resolve_with_token(&self) -> Result<(Credential, AccessToken)> {
        let scopes = [self.scope.as_str()];

        let interactive_error = match self.interactive.get_token(&scopes).await {
            Ok(token) => {
                info!("Authenticated with {}", self.interactive.name());
                let credential =
                    Credential::new(self.interactive.clone(), CredentialSource::CliSession);
                return Ok((credential, token));
            }
            Err(e) => e,
        };

        warn!(
            "Interactive authentication unavailable, trying environment credentials: {}",
            interactive_error
        );

        let provider = match self.fallback.build() {
            Ok(provider) => provider,
            Err(e) => {
                return Err(AzResolveError::authentication_failure(
                    interactive_error.to_string(),
                    e.to_string(),
                ))
            }
        };

        match provider.get_token(&scopes).await {
            Ok(token) => {
                debug!("Authenticated with {}", provider.name());
                let credential = Credential::new(provider, CredentialSource::ServicePrincipal);
                Ok((credential, token))
            }
            Err(e) => Err(AzResolveError::authentication_failure(
                interactive_error.to_string(),
                e.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SCOPE: &str = "https://management.azure.com/.default";

    /// Provider that always fails, counting how often it was asked
    struct FailingProvider {
        message: &'static str,
        calls: AtomicUsize,
    }

    impl FailingProvider {
        fn new(message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                message,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AzureAuthProvider for FailingProvider {
        async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AzResolveError::authentication(self.message))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn static_provider(token: &str) -> Arc<dyn AzureAuthProvider> {
        Arc::new(StaticTokenProvider::new(token))
    }

    fn resolver(
        interactive: Arc<dyn AzureAuthProvider>,
        fallback: MockFallbackCredential,
    ) -> CredentialResolver {
        CredentialResolver::new(SCOPE.to_string(), interactive, Box::new(fallback))
    }

    #[tokio::test]
    async fn test_interactive_success_skips_fallback() {
        let mut fallback = MockFallbackCredential::new();
        fallback.expect_build().times(0);

        let resolver = resolver(Arc::new(StaticTokenProvider::new("cli-token")), fallback);
        let credential = resolver.resolve().await.unwrap();

        assert_eq!(credential.source(), CredentialSource::CliSession);
        assert_eq!(credential.bearer_token(SCOPE).await.unwrap(), "cli-token");
    }

    #[tokio::test]
    async fn test_falls_back_when_interactive_fails() {
        let interactive = FailingProvider::new("az: not logged in");
        let mut fallback = MockFallbackCredential::new();
        fallback
            .expect_build()
            .times(1)
            .returning(|| Ok(static_provider("sp-token")));

        let resolver = resolver(interactive.clone(), fallback);
        let token = resolver.resolve_bearer_token().await.unwrap();

        assert_eq!(token, "sp-token");
        assert_eq!(interactive.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_credential_is_service_principal() {
        let mut fallback = MockFallbackCredential::new();
        fallback
            .expect_build()
            .returning(|| Ok(static_provider("sp-token")));

        let resolver = resolver(FailingProvider::new("no cli"), fallback);
        let credential = resolver.resolve().await.unwrap();
        assert_eq!(credential.source(), CredentialSource::ServicePrincipal);
    }

    #[tokio::test]
    async fn test_missing_environment_reports_both_causes() {
        let fallback = EnvironmentFallback::new(
            "https://login.microsoftonline.com".to_string(),
            ServicePrincipalConfig::default(),
        );
        let resolver = CredentialResolver::new(
            SCOPE.to_string(),
            FailingProvider::new("az: not logged in"),
            Box::new(fallback),
        );

        let err = resolver.resolve().await.unwrap_err();
        match err {
            AzResolveError::AuthenticationFailure {
                interactive,
                environment,
            } => {
                assert!(interactive.contains("az: not logged in"));
                assert!(environment.contains("AZURE_CLIENT_ID"));
                assert!(environment.contains("AZURE_SUBSCRIPTION_ID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_both_token_requests_failing_reports_both_causes() {
        let fallback_provider = FailingProvider::new("invalid client secret");
        let mut fallback = MockFallbackCredential::new();
        let returned = fallback_provider.clone();
        fallback
            .expect_build()
            .returning(move || Ok(returned.clone() as Arc<dyn AzureAuthProvider>));

        let resolver = resolver(FailingProvider::new("az: not logged in"), fallback);
        let message = resolver.resolve().await.unwrap_err().to_string();

        assert!(message.contains("az: not logged in"));
        assert!(message.contains("invalid client secret"));
        assert_eq!(fallback_provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_environment_fallback_builds_with_complete_settings() {
        let service_principal = ServicePrincipalConfig {
            tenant_id: Some("tenant".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some(zeroize::Zeroizing::new("secret".to_string())),
        };
        let fallback = EnvironmentFallback::new(
            "https://login.microsoftonline.com".to_string(),
            service_principal,
        );
        let provider = fallback.build().unwrap();
        assert_eq!(provider.name(), "service-principal");
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential::from_bearer_token("very-secret");
        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("StaticToken"));
    }
}
