//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap
//! and dispatches each command to an [`AzureLookup`] chain.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;
use crate::locate::{ResourceKind, STORAGE_ACCOUNT, WEB_APP};
use crate::lookup::AzureLookup;

#[derive(Parser, Debug)]
#[command(name = "azr")]
#[command(about = "Resolve Azure subscriptions, resource groups and access keys")]
#[command(version, author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subscription to use instead of the first one visible to the credential
    #[arg(long, global = true, value_name = "ID")]
    pub subscription: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the subscription lookups will use
    Subscription,

    /// List subscriptions visible to the resolved credential
    Subscriptions,

    /// Print the resource group of a named resource
    ResourceGroup {
        /// Resource name (case-sensitive)
        name: String,

        /// Resource type to search
        #[arg(long, value_enum, default_value = "storage")]
        kind: KindArg,

        /// Resolve a raw bearer token first and use it for the lookup
        #[arg(long)]
        with_token: bool,
    },

    /// Print the first access key of a storage account
    StorageKey {
        /// Storage account name
        account: String,
    },

    /// Print the function host master key of a web app
    MasterKey {
        /// Web app name
        app: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Storage,
    Webapp,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Storage => STORAGE_ACCOUNT,
            KindArg::Webapp => WEB_APP,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.debug {
            config.debug = true;
        }
        if let Some(subscription) = &self.subscription {
            config.subscription_id = Some(subscription.clone());
        }
    }

    pub async fn execute(self, config: Config, cancel: CancellationToken) -> Result<()> {
        let lookup = AzureLookup::new(config).with_cancellation(cancel);

        match self.command {
            Commands::Subscription => {
                let subscription_id = lookup.default_subscription().await?;
                self.emit("subscriptionId", &subscription_id);
            }
            Commands::Subscriptions => {
                let subscriptions = lookup.subscriptions().await?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&subscriptions)?);
                } else {
                    for subscription in subscriptions {
                        println!(
                            "{}\t{}",
                            subscription.subscription_id,
                            subscription.display_name.unwrap_or_default()
                        );
                    }
                }
            }
            Commands::ResourceGroup {
                ref name,
                kind,
                with_token,
            } => {
                let resource_group = if with_token && kind == KindArg::Storage {
                    lookup.storage_resource_group_with_token(name).await?
                } else {
                    lookup.resource_group(kind.into(), name).await?
                };
                self.emit("resourceGroup", &resource_group);
            }
            Commands::StorageKey { ref account } => {
                let key = lookup.storage_account_key(account).await?;
                self.emit("key", &key);
            }
            Commands::MasterKey { ref app } => {
                let key = lookup.web_app_master_key(app).await?;
                self.emit("masterKey", &key);
            }
        }

        Ok(())
    }

    fn emit(&self, field: &str, value: &str) {
        if self.json {
            println!("{}", json!({ field: value }));
        } else {
            println!("{}", value);
        }
    }
}
