//! azresolve - Azure credential and resource resolution
//!
//! Helpers that authenticate against Azure (CLI session first, service
//! principal environment variables second), pick a subscription, locate a
//! storage account or web app by name and fetch its access keys, so that
//! data-plane clients can be built without hand-copied secrets.

pub mod arm;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod locate;
pub mod lookup;
pub mod utils;

// Re-export commonly used types
pub use error::{AzResolveError, Result, ResultExt};
pub use lookup::{
    blob_service_client, storage_account_key, storage_resource_group_with_token,
    web_app_master_key, AzureLookup,
};
