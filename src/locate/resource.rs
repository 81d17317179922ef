//! Resource lookup by name within a subscription

use futures::{Stream, TryStreamExt};
use std::fmt;
use tracing::{debug, info};

use crate::arm::client::ManagementClient;
use crate::arm::models::ResourceSummary;
use crate::arm::pager::{list_items, Paging};
use crate::error::{AzResolveError, Result};

/// A listable resource type under a provider namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// Human-readable name used in errors and logs
    pub label: &'static str,
    /// `{namespace}/{type}` as it appears in the listing path
    pub provider_path: &'static str,
    pub api_version: &'static str,
    pub paging: Paging,
}

/// Storage accounts are listed with a single request
pub const STORAGE_ACCOUNT: ResourceKind = ResourceKind {
    label: "storage account",
    provider_path: "Microsoft.Storage/storageAccounts",
    api_version: "2021-04-01",
    paging: Paging::SinglePage,
};

/// Web apps (including function apps) are listed page by page
pub const WEB_APP: ResourceKind = ResourceKind {
    label: "web app",
    provider_path: "Microsoft.Web/sites",
    api_version: "2022-03-01",
    paging: Paging::FollowNextLink,
};

impl ResourceKind {
    /// Subscription-wide listing URL for this kind
    pub fn list_url(&self, client: &ManagementClient, subscription_id: &str) -> String {
        client.build_arm_url(&format!(
            "/subscriptions/{}/providers/{}?api-version={}",
            subscription_id, self.provider_path, self.api_version
        ))
    }

    /// URL of a single resource of this kind, with `suffix` appended to the path
    pub fn resource_url(
        &self,
        client: &ManagementClient,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
        suffix: &str,
    ) -> String {
        client.build_arm_url(&format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}{}?api-version={}",
            subscription_id, resource_group, self.provider_path, name, suffix, self.api_version
        ))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// Lazily list every resource of `kind` in the subscription
pub fn list_resources<'a>(
    client: &'a ManagementClient,
    subscription_id: &str,
    kind: ResourceKind,
) -> impl Stream<Item = Result<ResourceSummary>> + Send + 'a {
    list_items(client, kind.list_url(client, subscription_id), kind.paging)
}

/// Scan `resources` for the first entry named exactly `name`.
///
/// The comparison is case-sensitive and the scan stops at the first match,
/// so later pages are never requested.
pub async fn find_resource<S>(
    resources: S,
    kind: ResourceKind,
    name: &str,
) -> Result<ResourceSummary>
where
    S: Stream<Item = Result<ResourceSummary>>,
{
    futures::pin_mut!(resources);
    let mut scanned = 0usize;

    while let Some(resource) = resources.try_next().await? {
        scanned += 1;
        if resource.name == name {
            debug!("Matched {} '{}' after {} entries", kind, name, scanned);
            return Ok(resource);
        }
    }

    debug!("Scanned {} {} entries without a match", scanned, kind);
    Err(AzResolveError::resource_not_found(kind.label, name))
}

/// Resource group of the `kind` resource called `name`
pub async fn find_resource_group(
    client: &ManagementClient,
    subscription_id: &str,
    kind: ResourceKind,
    name: &str,
) -> Result<String> {
    let resource = find_resource(list_resources(client, subscription_id, kind), kind, name).await?;
    let resource_group = resource.resource_group()?;
    info!("Found {} '{}' in resource group '{}'", kind, name, resource_group);
    Ok(resource_group)
}
