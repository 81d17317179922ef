//! Subscription lookup

use futures::TryStreamExt;
use tracing::{debug, info};

use crate::arm::client::ManagementClient;
use crate::arm::models::SubscriptionSummary;
use crate::arm::pager::{list_items, Paging};
use crate::config::Config;
use crate::error::{AzResolveError, Result};

const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";

fn subscriptions_url(client: &ManagementClient) -> String {
    client.build_arm_url(&format!(
        "/subscriptions?api-version={}",
        SUBSCRIPTIONS_API_VERSION
    ))
}

/// List every subscription visible to the client's credential, in provider order
pub async fn list_subscriptions(client: &ManagementClient) -> Result<Vec<SubscriptionSummary>> {
    let subscriptions: Vec<SubscriptionSummary> =
        list_items(client, subscriptions_url(client), Paging::FollowNextLink)
            .try_collect()
            .await?;
    debug!("Found {} subscription(s)", subscriptions.len());
    Ok(subscriptions)
}

/// The first subscription the provider returns.
///
/// Provider order is not stable across accounts and no tenant filtering is
/// applied. Only the first page is fetched.
pub async fn first_subscription(client: &ManagementClient) -> Result<String> {
    let mut subscriptions = list_items::<SubscriptionSummary>(
        client,
        subscriptions_url(client),
        Paging::FollowNextLink,
    );

    match subscriptions.try_next().await? {
        Some(subscription) => {
            info!("Using subscription {}", subscription.subscription_id);
            Ok(subscription.subscription_id)
        }
        None => Err(AzResolveError::SubscriptionNotFound),
    }
}

/// Configured subscription if one is set, otherwise [`first_subscription`]
pub async fn select_subscription(config: &Config, client: &ManagementClient) -> Result<String> {
    match config.subscription_id.as_deref().map(str::trim) {
        Some(subscription_id) if !subscription_id.is_empty() => {
            debug!("Using configured subscription {}", subscription_id);
            Ok(subscription_id.to_string())
        }
        _ => first_subscription(client).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use crate::utils::network::NetworkConfig;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ManagementClient {
        ManagementClient::new(
            Credential::from_bearer_token("t"),
            &server.uri(),
            &NetworkConfig::default(),
            CancellationToken::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_configured_subscription_skips_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let config = Config {
            subscription_id: Some("pinned".to_string()),
            ..Config::default()
        };
        let selected = select_subscription(&config, &client(&server)).await.unwrap();
        assert_eq!(selected, "pinned");
    }

    #[tokio::test]
    async fn test_blank_configured_subscription_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{ "subscriptionId": "listed" }]
            })))
            .mount(&server)
            .await;

        let config = Config {
            subscription_id: Some("  ".to_string()),
            ..Config::default()
        };
        let selected = select_subscription(&config, &client(&server)).await.unwrap();
        assert_eq!(selected, "listed");
    }
}
