//! Rules catalog entities

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One remediation rule from the PingCastle rules catalog.
///
/// Immutable once parsed; identified solely by `riskId` within a pack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Unique rule identifier, e.g. `S-ADRegistration`
    pub risk_id: String,
    pub title: String,
    pub description: String,
    pub solution: String,
    pub documentation: String,
    pub technical_explanation: String,
    pub category: String,
    pub model: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub maturity_level: String,
}

/// Full rules pack payload written to object storage.
///
/// Content-addressed: `packId` is the hash of the raw document bytes, so a
/// byte-identical re-upload overwrites the same object with the same body.
/// The per-rule mapping lives only here, never in the index table, to bound
/// index-record size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesPackPayload {
    pub pack_id: String,
    pub source: String,
    pub artifact_type: String,
    pub ingested_at: String,
    pub raw_key: String,
    pub rule_count: usize,
    pub rules_by_risk_id: BTreeMap<String, RuleDefinition>,
    pub schema_version: String,
}

/// Small pointer payload written to the fixed "latest" location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPointerPayload {
    pub pack_id: String,
    pub curated_key: String,
    pub updated_at: String,
    pub rule_count: usize,
    pub schema_version: String,
}

/// Index-table record for one ingested pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesPackRecord {
    pub pk: String,
    pub sk: String,
    pub entity_type: String,
    pub pack_id: String,
    pub curated_key: String,
    pub updated_at: String,
    pub rule_count: usize,
    pub raw_key: String,
    pub schema_version: String,
}

/// Index-table record for the mutable latest pointer.
///
/// One per source system; overwritten on every successful rules ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesLatestRecord {
    pub pk: String,
    pub sk: String,
    pub entity_type: String,
    pub pack_id: String,
    pub curated_key: String,
    pub updated_at: String,
    pub rule_count: usize,
    pub schema_version: String,
}
