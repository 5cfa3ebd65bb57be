//! Infrastructure layer
//!
//! Contains implementations for external systems like files, keyrings, and the bridge API.

pub mod bridge;
pub mod storage;
