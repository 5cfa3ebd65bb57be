//! Bridge API integration
//!
//! Provides the HTTP client that implements the `NetworkService` capability
//! against a bridge server.

pub mod client;
pub mod credentials;

pub use client::{BridgeClient, BridgeClientBuilder};
pub use credentials::BridgeCredentials;
