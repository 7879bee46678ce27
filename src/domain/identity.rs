//! Content-addressed identifier derivation
//!
//! Every identifier in the pipeline (pack, run, finding) is a pure function
//! of document content. Trigger events are delivered at least once, so
//! re-processing the same document must land on the same keys at every
//! layer; idempotent keys are the deduplication mechanism, there is no side
//! table.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fixed namespace for all name-based (v5) UUID derivation.
pub const ID_NAMESPACE: Uuid = Uuid::from_u128(0x1f2e_0c64_9a1b_4c77_8d55_3f4a_6b2a_9e10_u128);

/// Hex-encoded SHA-256 of arbitrary bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Pack identifier: content hash of the raw rules document.
///
/// Stable under exact re-upload, changes under any byte difference
/// including whitespace.
pub fn pack_id(raw: &[u8]) -> String {
    sha256_hex(raw)
}

/// Run identifier derived from the raw report bytes.
pub fn run_id(source: &str, raw: &[u8]) -> Uuid {
    let name = format!("{}|report|{}", source, sha256_hex(raw));
    Uuid::new_v5(&ID_NAMESPACE, name.as_bytes())
}

/// Finding identifier derived from the owning run and the rule identifier.
pub fn finding_id(source: &str, run_id: &Uuid, risk_id: &str) -> Uuid {
    let name = format!("finding|{}|{}|{}", source, run_id, risk_id);
    Uuid::new_v5(&ID_NAMESPACE, name.as_bytes())
}
