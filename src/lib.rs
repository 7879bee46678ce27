//! adwatch-ingest - PingCastle artifact ingestion for the adwatch platform
//!
//! This crate ingests security-audit artifacts produced by PingCastle against
//! an Active Directory forest, normalizes them into a vendor-neutral finding
//! format, and persists both a queryable index and immutable curated
//! snapshots.
//!
//! # Modules
//!
//! - [`config`] — Strongly-typed configuration with file and environment variable support
//! - [`domain`] — Core domain models: rule packs, runs, findings, severity, identity
//! - [`application`] — The ingestion pipeline: event parsing, classification, processors
//! - [`infrastructure`] — XML tree model and object-store / index-table gateways
//! - [`logging`] — Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! adwatch-ingest/
//! ├── domain/           # Pure business logic
//! │   ├── catalog/      # Remediation rule definitions and packs
//! │   ├── report/       # Runs, findings, standardized payloads
//! │   ├── severity.rs   # Points -> severity step function
//! │   └── identity.rs   # Content-addressed identifier derivation
//! ├── application/      # Handler, classifier, the two processors
//! ├── infrastructure/   # quick-xml tree model, S3 + DynamoDB gateways
//! └── config/           # Configuration management
//! ```
//!
//! # Consistency model
//!
//! The pipeline dual-writes an object store and an index table without a
//! cross-store transaction. Every identifier (pack, run, finding) is a pure
//! function of document content, so redelivering the same trigger event
//! overwrites the same keys instead of duplicating records. Partial batches
//! converge on replay; nothing is rolled back.
//!
//! # Configuration
//!
//! Environment variables use the `ADWATCH__` prefix with double underscore
//! separators:
//!
//! ```bash
//! ADWATCH__INGEST__CURATED_BUCKET=my-curated-bucket
//! ADWATCH__INGEST__TABLE_NAME=adwatch-main
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
