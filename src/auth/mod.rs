//! Authentication module for Azure services
//!
//! This module provides the token providers used against Azure Resource
//! Manager and the two-tier credential resolver (Azure CLI session first,
//! service principal environment variables second).

pub mod provider;
pub mod resolver;

pub use provider::*;
pub use resolver::*;
