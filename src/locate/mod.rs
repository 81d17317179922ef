//! Resource discovery
//!
//! Subscription selection, name-based resource lookup and key retrieval
//! against Azure Resource Manager. Each function takes an explicitly
//! constructed [`ManagementClient`](crate::arm::ManagementClient) and keeps
//! no state between calls.

pub mod keys;
pub mod resource;
pub mod subscription;

pub use keys::*;
pub use resource::*;
pub use subscription::*;
