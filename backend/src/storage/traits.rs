//! # Storage Traits
//!
//! This module defines the storage abstraction that lets the persistence
//! adapter run on any durable key-value backend.

use anyhow::Result;
use async_trait::async_trait;

/// Asynchronous string key-value storage
///
/// Values are opaque serialized strings. A `set_item` overwrites any prior
/// value for the key; it is never a diff or append.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing is stored
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value stored under `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}
