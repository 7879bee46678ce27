//! Standardized finding payload (ASFF profile)
//!
//! The vendor-neutral record emitted for each finding, consumable by
//! downstream security-findings aggregators. Field names follow the AWS
//! Security Finding Format so curated snapshots can be imported without
//! translation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::severity::SeverityLabel;

/// ASFF schema version marker carried by every payload.
pub const STANDARDIZED_SCHEMA_VERSION: &str = "2018-10-08";

/// One standardized security finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StandardizedFinding {
    pub schema_version: String,
    /// Globally unique finding identifier, `adwatch:<findingId>`
    pub id: String,
    pub product_arn: String,
    pub generator_id: String,
    pub aws_account_id: String,
    pub types: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub severity: SeverityBlock,
    pub title: String,
    pub description: String,
    pub resources: Vec<ResourceRef>,
    /// Namespaced extension fields: `adwatch.*` for internal-system fields,
    /// `pingcastle.*` for source-tool-specific fields. Namespacing prevents
    /// key collisions if a second artifact source is added later.
    pub product_fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
}

/// Severity block: label, 0-100 normalized score, and the raw source value.
///
/// Label and normalized score are always derived together from the same
/// points value, never set independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeverityBlock {
    pub label: SeverityLabel,
    pub normalized: u8,
    pub original: String,
}

/// Resource the finding applies to (the assessed AD domain).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRef {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub id: String,
    pub partition: String,
    pub details: ResourceDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceDetails {
    pub other: BTreeMap<String, String>,
}

/// Optional remediation recommendation block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Remediation {
    pub recommendation: RemediationRecommendation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemediationRecommendation {
    pub text: String,
}

impl Remediation {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            recommendation: RemediationRecommendation { text: text.into() },
        }
    }
}
