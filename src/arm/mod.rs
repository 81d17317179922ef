//! Azure Resource Manager access
//!
//! REST client, response models, identifier parsing and the lazy listing
//! stream shared by every resource lookup.

pub mod client;
pub mod models;
pub mod pager;
pub mod resource_id;

pub use client::ManagementClient;
pub use models::*;
pub use pager::{list_items, Paging};
pub use resource_id::{resource_group_from_id, ResourceId};
