//! Resource Manager response models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::resource_id::resource_group_from_id;
use crate::error::Result;

/// One page of a Resource Manager listing: `{ "value": [...], "nextLink": "..." }`
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

/// Subscription entry from `GET /subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    #[serde(default)]
    pub id: String,
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Resource entry from a provider listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ResourceSummary {
    /// Resource group parsed from the identifier
    pub fn resource_group(&self) -> Result<String> {
        resource_group_from_id(&self.id)
    }
}

/// Response of `POST .../storageAccounts/{name}/listKeys`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageAccountKeys {
    #[serde(default)]
    pub keys: Vec<StorageAccountKey>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountKey {
    #[serde(default)]
    pub key_name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub permissions: Option<String>,
}

impl fmt::Debug for StorageAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAccountKey")
            .field("key_name", &self.key_name)
            .field("value", &"<redacted>")
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Response of `POST .../sites/{name}/host/default/listkeys`
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostKeys {
    #[serde(default)]
    pub master_key: Option<String>,
    #[serde(default)]
    pub function_keys: HashMap<String, String>,
    #[serde(default)]
    pub system_keys: HashMap<String, String>,
}

impl fmt::Debug for HostKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostKeys")
            .field("master_key", &self.master_key.as_ref().map(|_| "<redacted>"))
            .field("function_keys", &self.function_keys.keys().collect::<Vec<_>>())
            .field("system_keys", &self.system_keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
