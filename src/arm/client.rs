//! Azure Resource Manager REST client
//!
//! A thin, explicitly owned client: one per top-level operation, carrying the
//! credential, the endpoint and the cancellation token every request honors.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::auth::Credential;
use crate::config::Config;
use crate::error::{AzResolveError, Result};
use crate::utils::network::{classify_network_error, create_http_client, NetworkConfig};

pub struct ManagementClient {
    http_client: Client,
    credential: Credential,
    endpoint: String,
    scope: String,
    cancel: CancellationToken,
}

impl ManagementClient {
    /// Create a client for `endpoint` (for example `https://management.azure.com`)
    pub fn new(
        credential: Credential,
        endpoint: &str,
        network_config: &NetworkConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        url::Url::parse(&endpoint).map_err(|e| {
            AzResolveError::config(format!(
                "Invalid Resource Manager endpoint '{}': {}",
                endpoint, e
            ))
        })?;

        Ok(Self {
            http_client: create_http_client(network_config)?,
            credential,
            scope: format!("{}/.default", endpoint),
            endpoint,
            cancel,
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(
        credential: Credential,
        config: &Config,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let mut client = Self::new(
            credential,
            config.cloud.resource_manager_base(),
            &config.network,
            cancel,
        )?;
        client.scope = config.cloud.management_scope();
        Ok(client)
    }

    /// Build Azure Resource Manager URL
    pub fn build_arm_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.endpoint, path_and_query)
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send_json(Method::GET, url).await
    }

    /// POST `url` with an empty body and decode the JSON response
    pub async fn post_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send_json(Method::POST, url).await
    }

    async fn create_headers(&self) -> Result<HeaderMap> {
        let token = self.credential.bearer_token(&self.scope).await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", token).parse().map_err(|e| {
                AzResolveError::authentication(format!("Invalid token format: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, url: &str) -> Result<T> {
        if self.cancel.is_cancelled() {
            return Err(AzResolveError::Cancelled);
        }

        let request = async {
            let headers = self.create_headers().await?;
            debug!("{} {}", method, redact_query(url));

            let mut builder = self.http_client.request(method.clone(), url).headers(headers);
            if method == Method::POST {
                builder = builder.header(reqwest::header::CONTENT_LENGTH, 0);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| classify_network_error(&e, url))?;

            let status = response.status();
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                return Err(parse_azure_error(status.as_u16(), &error_body));
            }

            response.json::<T>().await.map_err(|e| {
                AzResolveError::serialization(format!(
                    "Failed to parse response from {}: {}",
                    redact_query(url),
                    e
                ))
            })
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(AzResolveError::Cancelled),
            result = request => result,
        }
    }
}

/// Parse Azure error response
pub fn parse_azure_error(status: u16, body: &str) -> AzResolveError {
    if let Ok(error_json) = serde_json::from_str::<Value>(body) {
        if let Some(error) = error_json.get("error") {
            let code = error.get("code").and_then(|c| c.as_str());
            if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
                let message = match code {
                    Some(code) => format!("{}: {}", code, message),
                    None => message.to_string(),
                };
                return AzResolveError::azure_api(status, message);
            }
        }
    }
    AzResolveError::azure_api(status, body)
}

fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(endpoint: &str, cancel: CancellationToken) -> ManagementClient {
        ManagementClient::new(
            Credential::from_bearer_token("test-token"),
            endpoint,
            &NetworkConfig::default(),
            cancel,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_azure_error() {
        let body = r#"{"error":{"code":"AuthorizationFailed","message":"no access"}}"#;
        match parse_azure_error(403, body) {
            AzResolveError::AzureApiError { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "AuthorizationFailed: no access");
            }
            other => panic!("unexpected error: {other}"),
        }

        match parse_azure_error(502, "Bad Gateway") {
            AzResolveError::AzureApiError { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_arm_url_trims_endpoint() {
        let client = client("https://management.azure.com/", CancellationToken::new());
        assert_eq!(
            client.build_arm_url("/subscriptions?api-version=2020-01-01"),
            "https://management.azure.com/subscriptions?api-version=2020-01-01"
        );
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let result = ManagementClient::new(
            Credential::from_bearer_token("t"),
            "management",
            &NetworkConfig::default(),
            CancellationToken::new(),
        );
        assert!(matches!(result, Err(AzResolveError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_get_json_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .and(query_param("api-version", "2020-01-01"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri(), CancellationToken::new());
        let url = client.build_arm_url("/subscriptions?api-version=2020-01-01");
        let body: Value = client.get_json(&url).await.unwrap();
        assert_eq!(body["value"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_azure_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "code": "ResourceNotFound", "message": "gone" }
            })))
            .mount(&server)
            .await;

        let client = client(&server.uri(), CancellationToken::new());
        let err = client
            .post_json::<Value>(&client.build_arm_url("/keys"))
            .await
            .unwrap_err();
        assert!(matches!(err, AzResolveError::AzureApiError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = client(&server.uri(), cancel);
        let err = client
            .get_json::<Value>(&client.build_arm_url("/subscriptions"))
            .await
            .unwrap_err();
        assert!(matches!(err, AzResolveError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_inflight_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(std::time::Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let client = client(&server.uri(), cancel.clone());
        let url = client.build_arm_url("/subscriptions");

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let err = client.get_json::<Value>(&url).await.unwrap_err();
        assert!(matches!(err, AzResolveError::Cancelled));
        canceller.await.unwrap();
    }
}
