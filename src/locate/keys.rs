//! Access key retrieval for located resources

use tracing::info;

use super::resource::{ResourceKind, STORAGE_ACCOUNT, WEB_APP};
use crate::arm::client::ManagementClient;
use crate::arm::models::{HostKeys, StorageAccountKeys};
use crate::error::{AzResolveError, Result};

const STORAGE_KEYS_API_VERSION: &str = "2023-01-01";

fn describe(kind: ResourceKind, name: &str) -> String {
    format!("{} '{}'", kind, name)
}

/// First access key of a storage account, in provider order.
///
/// No rotation or permission comparison is done; `key1` is normally first.
pub async fn fetch_primary_key(
    client: &ManagementClient,
    subscription_id: &str,
    resource_group: &str,
    account_name: &str,
) -> Result<String> {
    let kind = ResourceKind {
        api_version: STORAGE_KEYS_API_VERSION,
        ..STORAGE_ACCOUNT
    };
    let url = kind.resource_url(client, subscription_id, resource_group, account_name, "/listKeys");
    let response: StorageAccountKeys = client.post_json(&url).await?;

    let key = response
        .keys
        .into_iter()
        .next()
        .filter(|key| !key.value.is_empty())
        .ok_or_else(|| AzResolveError::key_list_empty(describe(STORAGE_ACCOUNT, account_name)))?;

    info!(
        "Using key '{}' of storage account '{}'",
        key.key_name, account_name
    );
    Ok(key.value)
}

/// Master key of a web app's function host
pub async fn fetch_master_key(
    client: &ManagementClient,
    subscription_id: &str,
    resource_group: &str,
    app_name: &str,
) -> Result<String> {
    let url = WEB_APP.resource_url(
        client,
        subscription_id,
        resource_group,
        app_name,
        "/host/default/listkeys",
    );
    let keys: HostKeys = client.post_json(&url).await?;

    let master_key = keys
        .master_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AzResolveError::key_list_empty(describe(WEB_APP, app_name)))?;

    info!("Retrieved host master key of web app '{}'", app_name);
    Ok(master_key)
}
