//! Keyward Core Library
//!
//! This crate provides the core functionality for Keyward, including:
//! - Keypair lifecycle (generate, register, unregister)
//! - In-memory key state mirrored into durable storage
//! - Storage backends (file, OS keyring, in-memory)
//! - Bridge HTTP client implementing the network-service capability
//! - Configuration with file persistence

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{Error, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::keys::{
        KeyLifecycleService, KeyStore, Keypair, NetworkService, RegisterKeyRequest,
        UnregisterOutcome,
    };
    pub use crate::error::{Error, ErrorKind, Result};
}

#[cfg(test)]
mod config_tests;
