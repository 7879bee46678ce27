//! Application Layer - The ingestion pipeline
//!
//! Control flow: event parsing -> document load -> XML normalization ->
//! artifact classification -> one of the two processors -> persistence
//! gateways.

pub mod classify;
pub mod errors;
pub mod event;
pub mod handler;
pub mod report;
pub mod rules;

pub use classify::{classify, ArtifactKind};
pub use errors::IngestError;
pub use event::{extract_object_ref, ObjectRef};
pub use handler::{IngestOutcome, IngestService, SkipReason};
