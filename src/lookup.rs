//! Top-level lookup chains
//!
//! Each method runs the full chain on its own: resolve a credential, build a
//! fresh [`ManagementClient`], pick the subscription, locate the resource and
//! fetch what was asked for. Nothing is cached between calls, so repeated
//! calls observe provider changes.

use std::future::Future;

use azure_storage::StorageCredentials;
use azure_storage_blobs::prelude::BlobServiceClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::arm::client::ManagementClient;
use crate::arm::models::SubscriptionSummary;
use crate::auth::{Credential, CredentialResolver};
use crate::config::Config;
use crate::error::{AzResolveError, Result, ResultExt};
use crate::locate::{
    fetch_master_key, fetch_primary_key, find_resource, find_resource_group, list_resources,
    list_subscriptions, select_subscription, ResourceKind, STORAGE_ACCOUNT, WEB_APP,
};

pub struct AzureLookup {
    config: Config,
    credentials: CredentialResolver,
    cancel: CancellationToken,
}

impl AzureLookup {
    /// Lookup using the Azure CLI session with environment fallback
    pub fn new(config: Config) -> Self {
        let credentials = CredentialResolver::from_config(&config);
        Self {
            config,
            credentials,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the credential chain
    pub fn with_credentials(mut self, credentials: CredentialResolver) -> Self {
        self.credentials = credentials;
        self
    }

    /// Abort in-flight and future requests when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run `operation` until it completes or the lookup is cancelled
    async fn until_cancelled<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AzResolveError::Cancelled);
        }

        tokio::select! {
            _ = self.cancel.cancelled() => Err(AzResolveError::Cancelled),
            result = operation => result,
        }
    }

    async fn connect(&self) -> Result<ManagementClient> {
        let credential = self
            .until_cancelled(self.credentials.resolve())
            .await
            .context("auth initialization failed")?;
        info!("Authenticated via {}", credential.source());
        ManagementClient::from_config(credential, &self.config, self.cancel.clone())
    }

    async fn subscription(&self, client: &ManagementClient) -> Result<String> {
        select_subscription(&self.config, client)
            .await
            .context("could not infer subscription id for logged in user")
    }

    /// Every subscription visible to the resolved credential
    pub async fn subscriptions(&self) -> Result<Vec<SubscriptionSummary>> {
        let client = self.connect().await?;
        list_subscriptions(&client)
            .await
            .context("failed to list subscriptions")
    }

    /// Subscription the other lookups would use
    pub async fn default_subscription(&self) -> Result<String> {
        let client = self.connect().await?;
        self.subscription(&client).await
    }

    /// Resource group of the `kind` resource called `name`
    pub async fn resource_group(&self, kind: ResourceKind, name: &str) -> Result<String> {
        let client = self.connect().await?;
        let subscription_id = self.subscription(&client).await?;
        find_resource_group(&client, &subscription_id, kind, name)
            .await
            .with_context(|| format!("could not find {} '{}'", kind, name))
    }

    /// First access key of the storage account `account_name`
    pub async fn storage_account_key(&self, account_name: &str) -> Result<String> {
        let client = self.connect().await?;
        let subscription_id = self.subscription(&client).await?;

        let resource_group =
            find_resource_group(&client, &subscription_id, STORAGE_ACCOUNT, account_name)
                .await
                .with_context(|| format!("could not find storage account '{}'", account_name))?;

        fetch_primary_key(&client, &subscription_id, &resource_group, account_name)
            .await
            .with_context(|| format!("failed to list keys of storage account '{}'", account_name))
    }

    /// Blob service client for `account_name`, authorized with its first access key
    pub async fn blob_service_client(&self, account_name: &str) -> Result<BlobServiceClient> {
        let key = self.storage_account_key(account_name).await?;
        let credentials = StorageCredentials::access_key(account_name.to_string(), key);
        Ok(BlobServiceClient::new(account_name.to_string(), credentials))
    }

    /// Function host master key of the web app `app_name`
    pub async fn web_app_master_key(&self, app_name: &str) -> Result<String> {
        let client = self.connect().await?;
        let subscription_id = self.subscription(&client).await?;

        let site = find_resource(
            list_resources(&client, &subscription_id, WEB_APP),
            WEB_APP,
            app_name,
        )
        .await
        .with_context(|| format!("could not find site with name '{}'", app_name))?;
        let resource_group = site
            .resource_group()
            .with_context(|| format!("could not find site with name '{}'", app_name))?;

        fetch_master_key(&client, &subscription_id, &resource_group, &site.name)
            .await
            .with_context(|| format!("failed to list host keys for app with name '{}'", app_name))
    }

    /// Resource group of a storage account, looked up with a raw bearer token.
    ///
    /// The token is resolved through the same chain, then used as an opaque
    /// credential for the listing calls.
    pub async fn storage_resource_group_with_token(&self, account_name: &str) -> Result<String> {
        let token = self
            .until_cancelled(self.credentials.resolve_bearer_token())
            .await
            .context("failed to obtain bearer token")?;
        let client = ManagementClient::from_config(
            Credential::from_bearer_token(token),
            &self.config,
            self.cancel.clone(),
        )?;

        let subscription_id = self.subscription(&client).await?;
        find_resource_group(&client, &subscription_id, STORAGE_ACCOUNT, account_name)
            .await
            .with_context(|| format!("could not find storage account '{}'", account_name))
    }
}

/// First access key of `account_name`, resolved with the default credential chain
pub async fn storage_account_key(
    config: Config,
    cancel: CancellationToken,
    account_name: &str,
) -> Result<String> {
    AzureLookup::new(config)
        .with_cancellation(cancel)
        .storage_account_key(account_name)
        .await
}

/// Blob service client for `account_name`, authorized with its first access key
pub async fn blob_service_client(
    config: Config,
    cancel: CancellationToken,
    account_name: &str,
) -> Result<BlobServiceClient> {
    AzureLookup::new(config)
        .with_cancellation(cancel)
        .blob_service_client(account_name)
        .await
}

/// Function host master key of `app_name`
pub async fn web_app_master_key(
    config: Config,
    cancel: CancellationToken,
    app_name: &str,
) -> Result<String> {
    AzureLookup::new(config)
        .with_cancellation(cancel)
        .web_app_master_key(app_name)
        .await
}

/// Storage account resource group, looked up with a raw bearer token
pub async fn storage_resource_group_with_token(
    config: Config,
    cancel: CancellationToken,
    account_name: &str,
) -> Result<String> {
    AzureLookup::new(config)
        .with_cancellation(cancel)
        .storage_resource_group_with_token(account_name)
        .await
}
