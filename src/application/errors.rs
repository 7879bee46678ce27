//! Application error types

use crate::infrastructure::storage::StorageError;

/// Fatal ingestion failure.
///
/// Content-level irregularities (not XML, unknown artifact, empty report,
/// missing enrichment pack, malformed rows) are NOT errors; they degrade to
/// skip outcomes or per-row skips. Only storage I/O failures abort an
/// invocation, and those are surfaced for infrastructure-level redelivery.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
