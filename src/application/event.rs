//! Trigger event envelope parsing
//!
//! The handler is triggered by "a new document appeared in storage" events
//! and tolerates two envelope shapes:
//!
//! - EventBridge: `{ "detail": { "bucket": { "name" }, "object": { "key" } } }`
//! - S3 notification: `{ "Records": [ { "s3": { "bucket": { "name" }, "object": { "key" } } } ] }`
//!
//! Any other shape is a malformed trigger: reported immediately, no I/O
//! attempted.

use serde_json::Value;

/// Bucket/key reference extracted from a trigger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// Extract the uploaded object's location from either envelope shape.
pub fn extract_object_ref(event: &Value) -> Option<ObjectRef> {
    if let Some(detail) = event.get("detail") {
        let bucket = detail.get("bucket")?.get("name")?.as_str()?;
        let key = detail.get("object")?.get("key")?.as_str()?;
        return Some(ObjectRef {
            bucket: bucket.to_string(),
            key: decode_key(key),
        });
    }

    if let Some(records) = event.get("Records").and_then(Value::as_array) {
        for record in records {
            let Some(s3) = record.get("s3") else { continue };
            let bucket = s3.get("bucket")?.get("name")?.as_str()?;
            let key = s3.get("object")?.get("key")?.as_str()?;
            return Some(ObjectRef {
                bucket: bucket.to_string(),
                key: decode_key(key),
            });
        }
    }

    None
}

/// S3 notification keys are URL-encoded with `+` standing for space.
fn decode_key(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}
