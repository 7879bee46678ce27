//! Report entities and index-table records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::standardized::StandardizedFinding;
use crate::domain::severity::SeverityLabel;

/// One raw finding row extracted from a report's risk-rules collection.
///
/// Transient; consumed immediately to build a standardized finding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRow {
    pub risk_id: String,
    pub category: String,
    pub model: String,
    /// Raw numeric string as reported by the source
    pub points: String,
    pub rationale: String,
}

/// Count of findings per severity label for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct RunStats {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub informational: u32,
}

impl RunStats {
    /// Count one finding with the given label.
    pub fn record(&mut self, label: SeverityLabel) {
        match label {
            SeverityLabel::Critical => self.critical += 1,
            SeverityLabel::High => self.high += 1,
            SeverityLabel::Medium => self.medium += 1,
            SeverityLabel::Low => self.low += 1,
            SeverityLabel::Informational => self.informational += 1,
        }
    }

    /// Total findings across all labels; always equals the run's finding count.
    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low + self.informational
    }
}

/// Run summary record (`RUN#<runId>` / `META`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub pk: String,
    pub sk: String,
    pub entity_type: String,
    pub run_id: Uuid,
    pub source: String,
    pub domain: String,
    pub generation_date: String,
    pub generation_date_utc: String,
    pub created_at: String,
    pub raw_key: String,
    pub rules_pack_id: Option<String>,
    pub finding_count: usize,
    pub stats: RunStats,
    pub schema_version: String,
}

/// Chronological run-index record (`RUNS#<source>` / `<utc>#RUN#<runId>`).
///
/// Supports latest-N queries with a single descending range read, no scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunIndexRecord {
    pub pk: String,
    pub sk: String,
    pub entity_type: String,
    pub run_id: Uuid,
    pub source: String,
    pub domain: String,
    pub generation_date: String,
    pub generation_date_utc: String,
    pub finding_count: usize,
    pub schema_version: String,
}

/// Per-finding record keyed under the owning run
/// (`RUN#<runId>` / `FINDING#<findingId>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingRecord {
    pub pk: String,
    pub sk: String,
    pub entity_type: String,
    pub run_id: Uuid,
    pub finding_id: Uuid,
    pub source: String,
    pub domain: String,
    pub risk_id: String,
    pub severity_label: SeverityLabel,
    pub title: String,
    pub standardized: StandardizedFinding,
    pub schema_version: String,
}

/// Inverted-index record keyed by finding identifier alone
/// (`FINDING#<findingId>` / `META`); supports direct finding lookup without
/// knowing the owning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingIndexRecord {
    pub pk: String,
    pub sk: String,
    pub entity_type: String,
    pub run_id: Uuid,
    pub finding_id: Uuid,
    pub source: String,
    pub domain: String,
    pub risk_id: String,
    pub severity_label: SeverityLabel,
    pub title: String,
    pub standardized: StandardizedFinding,
    pub schema_version: String,
}

/// Curated run snapshot written to object storage: full standardized-finding
/// list plus run metadata, independent of the index-table writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshotPayload {
    pub run_id: Uuid,
    pub source: String,
    pub domain: String,
    pub generation_date: String,
    pub generation_date_utc: String,
    pub raw_key: String,
    pub rules_pack_id: Option<String>,
    pub finding_count: usize,
    pub stats: RunStats,
    pub findings: Vec<StandardizedFinding>,
    pub schema_version: String,
}
