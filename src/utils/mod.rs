//! Utility functions module
//!
//! HTTP client construction and network error classification.

pub mod network;

pub use network::*;
