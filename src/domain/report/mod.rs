//! Report domain: runs, findings, and the standardized finding payload

mod entities;
mod standardized;
mod value_objects;

pub use entities::{
    FindingIndexRecord, FindingRecord, ReportRow, RunIndexRecord, RunRecord, RunSnapshotPayload,
    RunStats,
};
pub use standardized::{
    Remediation, RemediationRecommendation, ResourceDetails, ResourceRef, SeverityBlock,
    StandardizedFinding, STANDARDIZED_SCHEMA_VERSION,
};
pub use value_objects::{format_utc, normalize_domain, normalize_generation_date};
