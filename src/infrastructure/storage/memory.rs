//! In-memory gateway implementations
//!
//! Back the integration test suite and local experimentation. Same
//! overwrite-by-key semantics as the AWS-backed gateways.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{IndexTable, ObjectStore, StorageError};

/// In-memory object store keyed by (bucket, key).
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<(String, String), Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, e.g. a raw uploaded artifact.
    pub async fn put_raw(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), body);
    }

    /// Read back a stored object without going through the trait.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.object(bucket, key)
            .await
            .ok_or_else(|| StorageError::ObjectRead {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "no such object".to_string(),
            })
    }

    async fn put_json(&self, bucket: &str, key: &str, body: &Value) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(body)?;
        self.put_raw(bucket, key, bytes).await;
        Ok(())
    }
}

/// In-memory index table keyed by (pk, sk).
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndexTable {
    items: Arc<RwLock<BTreeMap<(String, String), Value>>>,
}

impl InMemoryIndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    /// All items in a partition, in sort-key order.
    pub async fn partition(&self, pk: &str) -> Vec<Value> {
        self.items
            .read()
            .await
            .iter()
            .filter(|((item_pk, _), _)| item_pk == pk)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

fn item_keys(item: &Value) -> Result<(String, String), StorageError> {
    let pk = item.get("pk").and_then(Value::as_str);
    let sk = item.get("sk").and_then(Value::as_str);
    match (pk, sk) {
        (Some(pk), Some(sk)) => Ok((pk.to_string(), sk.to_string())),
        _ => Err(StorageError::IndexWrite {
            message: "item is missing pk or sk".to_string(),
        }),
    }
}

#[async_trait]
impl IndexTable for InMemoryIndexTable {
    async fn put_item(&self, item: Value) -> Result<(), StorageError> {
        let keys = item_keys(&item)?;
        self.items.write().await.insert(keys, item);
        Ok(())
    }

    async fn batch_put(&self, items: Vec<Value>) -> Result<(), StorageError> {
        let mut guard = self.items.write().await;
        for item in items {
            let keys = item_keys(&item)?;
            guard.insert(keys, item);
        }
        Ok(())
    }

    async fn get_item(&self, pk: &str, sk: &str) -> Result<Option<Value>, StorageError> {
        Ok(self
            .items
            .read()
            .await
            .get(&(pk.to_string(), sk.to_string()))
            .cloned())
    }
}
