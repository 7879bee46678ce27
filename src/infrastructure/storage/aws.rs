//! AWS-backed gateway implementations (S3 + DynamoDB)

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_s3::primitives::ByteStream;
use serde_json::Value;
use tracing::{debug, warn};

use super::{IndexTable, ObjectStore, StorageError};

/// S3-backed object store.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::ObjectRead {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::ObjectRead {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put_json(&self, bucket: &str, key: &str, body: &Value) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(body)?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::ObjectWrite {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!(bucket, key, "curated object written");
        Ok(())
    }
}

/// DynamoDB-backed index table.
pub struct DynamoIndexTable {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

/// DynamoDB caps batch writes at 25 items per request.
const BATCH_LIMIT: usize = 25;

/// Bounded local resubmits of unprocessed batch items. Safe because every
/// write is idempotent by key.
const BATCH_RETRIES: usize = 3;

impl DynamoIndexTable {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl IndexTable for DynamoIndexTable {
    async fn put_item(&self, item: Value) -> Result<(), StorageError> {
        let attributes = json_object_to_attributes(&item)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(attributes))
            .send()
            .await
            .map_err(|e| StorageError::IndexWrite {
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn batch_put(&self, items: Vec<Value>) -> Result<(), StorageError> {
        for chunk in items.chunks(BATCH_LIMIT) {
            let mut requests = Vec::with_capacity(chunk.len());
            for item in chunk {
                let attributes = json_object_to_attributes(item)?;
                let put = PutRequest::builder()
                    .set_item(Some(attributes))
                    .build()
                    .map_err(|e| StorageError::IndexWrite {
                        message: e.to_string(),
                    })?;
                requests.push(WriteRequest::builder().put_request(put).build());
            }

            let mut pending = requests;
            let mut attempts = 0;
            while !pending.is_empty() {
                if attempts > BATCH_RETRIES {
                    return Err(StorageError::IndexWrite {
                        message: format!(
                            "{} items still unprocessed after {} attempts",
                            pending.len(),
                            attempts
                        ),
                    });
                }
                attempts += 1;

                let response = self
                    .client
                    .batch_write_item()
                    .request_items(self.table_name.clone(), pending)
                    .send()
                    .await
                    .map_err(|e| StorageError::IndexWrite {
                        message: e.to_string(),
                    })?;

                pending = response
                    .unprocessed_items
                    .and_then(|mut map| map.remove(&self.table_name))
                    .unwrap_or_default();

                if !pending.is_empty() {
                    warn!(
                        unprocessed = pending.len(),
                        attempt = attempts,
                        "resubmitting unprocessed index writes"
                    );
                }
            }
        }
        Ok(())
    }

    async fn get_item(&self, pk: &str, sk: &str) -> Result<Option<Value>, StorageError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(pk.to_string()))
            .key("sk", AttributeValue::S(sk.to_string()))
            .send()
            .await
            .map_err(|e| StorageError::IndexRead {
                message: e.to_string(),
            })?;

        Ok(response.item.map(|item| {
            Value::Object(
                item.into_iter()
                    .map(|(k, v)| (k, attribute_to_json(v)))
                    .collect(),
            )
        }))
    }
}

fn json_object_to_attributes(
    item: &Value,
) -> Result<HashMap<String, AttributeValue>, StorageError> {
    match item {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), json_to_attribute(v)))
            .collect()),
        _ => Err(StorageError::IndexWrite {
            message: "index item must be a JSON object".to_string(),
        }),
    }
}

fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => {
            AttributeValue::L(items.iter().map(json_to_attribute).collect())
        }
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

fn attribute_to_json(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::from(i)
            } else if let Ok(f) = n.parse::<f64>() {
                Value::from(f)
            } else {
                Value::String(n)
            }
        }
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => {
            Value::Array(items.into_iter().map(attribute_to_json).collect())
        }
        AttributeValue::M(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, attribute_to_json(v)))
                .collect(),
        ),
        other => Value::String(format!("{:?}", other)),
    }
}
