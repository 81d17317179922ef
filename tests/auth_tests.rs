use std::sync::Arc;

use azresolve::auth::{
    AzureAuthProvider, Credential, CredentialResolver, CredentialSource, EnvironmentFallback,
    FallbackCredential, StaticTokenProvider,
};
use azresolve::config::{Config, ServicePrincipalConfig};
use azresolve::AzResolveError;
use time::OffsetDateTime;
use zeroize::Zeroizing;

const SCOPE: &str = "https://management.azure.com/.default";

fn environment_fallback(service_principal: ServicePrincipalConfig) -> Box<EnvironmentFallback> {
    Box::new(EnvironmentFallback::new(
        "https://login.microsoftonline.com".to_string(),
        service_principal,
    ))
}

#[cfg(test)]
mod static_token_tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_keeps_expiry() {
        let expires_at = OffsetDateTime::now_utc() + time::Duration::minutes(5);
        let provider = StaticTokenProvider::with_expiry("opaque", expires_at);

        let token = provider.get_token(&[SCOPE]).await.unwrap();

        assert_eq!(token.token.secret(), "opaque");
        assert_eq!(token.expires_on, expires_at);
    }

    #[tokio::test]
    async fn test_bearer_credential_reports_static_source() {
        let credential = Credential::from_bearer_token("raw-token");

        assert_eq!(credential.source(), CredentialSource::StaticToken);
        assert_eq!(credential.bearer_token(SCOPE).await.unwrap(), "raw-token");
    }
}

#[cfg(test)]
mod resolver_tests {
    use super::*;

    #[tokio::test]
    async fn test_interactive_session_wins() {
        let resolver = CredentialResolver::new(
            SCOPE.to_string(),
            Arc::new(StaticTokenProvider::new("cli-token")),
            environment_fallback(ServicePrincipalConfig::default()),
        );

        let credential = resolver.resolve().await.unwrap();
        assert_eq!(credential.source(), CredentialSource::CliSession);
        assert_eq!(resolver.resolve_bearer_token().await.unwrap(), "cli-token");
    }

    #[tokio::test]
    async fn test_partial_environment_names_missing_variable() {
        let service_principal = ServicePrincipalConfig {
            tenant_id: Some("tenant".to_string()),
            client_id: Some("client".to_string()),
            client_secret: None,
        };
        let resolver = CredentialResolver::new(
            SCOPE.to_string(),
            Arc::new(StaticTokenProvider::new("")),
            environment_fallback(service_principal),
        );

        let err = resolver.resolve().await.unwrap_err();
        match err.root() {
            AzResolveError::AuthenticationFailure {
                interactive,
                environment,
            } => {
                assert!(interactive.contains("Bearer token is empty"));
                assert!(environment.contains("AZURE_CLIENT_SECRET"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_environment_fallback_builds_service_principal() {
        let mut config = Config::default();
        config.service_principal = ServicePrincipalConfig {
            tenant_id: Some("tenant".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some(Zeroizing::new("secret".to_string())),
        };

        let fallback = EnvironmentFallback::new(
            config.cloud.authority_host.clone(),
            config.service_principal.clone(),
        );
        let provider = fallback.build().unwrap();
        assert_eq!(provider.name(), "service-principal");
    }
}
