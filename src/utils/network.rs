use crate::error::{AzResolveError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for HTTP client with proper timeouts and user-friendly error handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            user_agent: format!("azresolve/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Create a properly configured HTTP client with timeouts
pub fn create_http_client(config: &NetworkConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| AzResolveError::network(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a transport failure into an error that names the endpoint host
pub fn classify_network_error(error: &reqwest::Error, url: &str) -> AzResolveError {
    let host = extract_host(url);

    if error.is_timeout() {
        return AzResolveError::connection_timeout(format!(
            "Request to '{}' timed out",
            host
        ));
    }

    if error.is_connect() {
        if is_dns_resolution_error(error) {
            return AzResolveError::network(format!(
                "Unable to resolve '{}'. Check the configured endpoint and your network connection.",
                host
            ));
        }

        return AzResolveError::network(format!(
            "Failed to connect to '{}': {}",
            host, error
        ));
    }

    if error.is_decode() {
        return AzResolveError::serialization(format!(
            "Failed to decode response from '{}': {}",
            host, error
        ));
    }

    AzResolveError::network(format!("Network error when calling '{}': {}", host, error))
}

fn is_dns_resolution_error(error: &reqwest::Error) -> bool {
    let error_msg = error.to_string().to_lowercase();
    let dns_indicators = [
        "dns",
        "name resolution",
        "failed to lookup address",
        "name or service not known",
        "nodename nor servname provided",
        "no such host",
        "could not resolve host",
    ];

    dns_indicators
        .iter()
        .any(|&indicator| error_msg.contains(indicator))
}

fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "unknown-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host() {
        let url = "https://management.azure.com/subscriptions?api-version=2020-01-01";
        assert_eq!(extract_host(url), "management.azure.com");
        assert_eq!(extract_host("not a url"), "unknown-host");
    }

    #[test]
    fn test_default_network_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("azresolve/"));
        assert!(create_http_client(&config).is_ok());
    }

    #[test]
    fn test_network_config_reads_seconds() {
        let config: NetworkConfig = toml::from_str("request_timeout = 15").unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }
}
