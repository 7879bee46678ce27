//! Persistence gateways: object store and index table
//!
//! The narrow interface the pipeline writes through. Both gateways are
//! injected as trait objects so processors can be exercised against
//! in-memory implementations. All writes are idempotent by key; there is no
//! cross-store transaction and none is needed (see crate docs).

pub mod aws;
pub mod layout;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

/// Storage I/O failure. Fatal for the invocation: propagated to the caller
/// for infrastructure-level redelivery, never retried in a loop here beyond
/// the cheap idempotent batch resubmit in the DynamoDB gateway.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read object s3://{bucket}/{key}: {message}")]
    ObjectRead {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to write object s3://{bucket}/{key}: {message}")]
    ObjectWrite {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Index table read failed: {message}")]
    IndexRead { message: String },

    #[error("Index table write failed: {message}")]
    IndexWrite { message: String },

    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Object storage gateway (raw input bucket and curated output bucket).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch raw object bytes.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a JSON document, overwriting any existing object at the key.
    async fn put_json(&self, bucket: &str, key: &str, body: &Value) -> Result<(), StorageError>;
}

/// Index table gateway. Items are JSON objects carrying `pk` and `sk`
/// string members; puts overwrite by key.
#[async_trait]
pub trait IndexTable: Send + Sync {
    async fn put_item(&self, item: Value) -> Result<(), StorageError>;

    /// Write a logical batch. All-or-nothing is NOT guaranteed: the
    /// pipeline relies on deterministic keys so a retried partial batch
    /// converges to the same end state on replay.
    async fn batch_put(&self, items: Vec<Value>) -> Result<(), StorageError>;

    async fn get_item(&self, pk: &str, sk: &str) -> Result<Option<Value>, StorageError>;
}
