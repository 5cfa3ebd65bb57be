//! Durable key-value storage backends
//!
//! Each backend implements `KeyValueStorage` over a namespace.

pub mod file;
pub mod keyring;
pub mod memory;

pub use file::FileStorage;
pub use self::keyring::KeyringStorage;
pub use memory::InMemoryStorage;
