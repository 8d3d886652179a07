//! Key-value ledger boundary.
//!
//! The external collaborator stores JSON documents under string keys, either
//! in the shared world state or in one of the private partitions. Every
//! committed write becomes a new version of the key; nothing is deleted.
//! Each invocation is assumed to run with serializable access to the keys it
//! touches, so this layer does no locking of its own beyond keeping the
//! in-memory map consistent.

pub mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use materialtrace_core::DomainError;
use materialtrace_fulfillment::Partition;

pub use in_memory::InMemoryKvStore;

/// Where a key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Shared world state: one primary record per purchase order.
    World,
    Private(Partition),
}

impl core::fmt::Display for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Namespace::World => f.write_str("world"),
            Namespace::Private(p) => f.write_str(p.collection_name()),
        }
    }
}

impl From<Partition> for Namespace {
    fn from(value: Partition) -> Self {
        Namespace::Private(value)
    }
}

/// One committed version of a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioned {
    /// Starts at 1 and increases by one per committed write.
    pub version: u64,
    pub committed_at: DateTime<Utc>,
    pub value: JsonValue,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend refused the read or write.
    #[error("store backend failure in {namespace}: {message}")]
    Backend { namespace: String, message: String },

    #[error("record serialization failed: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn backend(namespace: Namespace, message: impl Into<String>) -> Self {
        Self::Backend {
            namespace: namespace.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serialization(value.to_string())
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        DomainError::persistence(value.to_string())
    }
}

/// Versioned JSON key-value store.
///
/// Implementations must:
/// - keep every committed version of a key, oldest first
/// - return `scan` results ordered by key
/// - never surface a partially applied write
pub trait KvStore: Send + Sync {
    /// Latest committed value of `key`.
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<JsonValue>, StoreError>;

    /// Commit a new version of `key`; returns the version number.
    fn put(&self, namespace: Namespace, key: &str, value: JsonValue) -> Result<u64, StoreError>;

    /// Latest value of every key in `namespace`.
    fn scan(&self, namespace: Namespace) -> Result<Vec<(String, JsonValue)>, StoreError>;

    /// Every committed version of `key`, oldest first. Empty when the key
    /// was never written.
    fn history(&self, namespace: Namespace, key: &str) -> Result<Vec<Versioned>, StoreError>;
}

impl<S> KvStore for Arc<S>
where
    S: KvStore + ?Sized,
{
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<JsonValue>, StoreError> {
        (**self).get(namespace, key)
    }

    fn put(&self, namespace: Namespace, key: &str, value: JsonValue) -> Result<u64, StoreError> {
        (**self).put(namespace, key, value)
    }

    fn scan(&self, namespace: Namespace) -> Result<Vec<(String, JsonValue)>, StoreError> {
        (**self).scan(namespace)
    }

    fn history(&self, namespace: Namespace, key: &str) -> Result<Vec<Versioned>, StoreError> {
        (**self).history(namespace, key)
    }
}
