//! Rules-catalog processor
//!
//! Extracts the remediation-rule catalog, content-hashes the document to
//! derive the pack identifier, and persists the pack plus the latest
//! pointer. All four writes are independent and idempotent by key, so a
//! redelivered event re-runs the whole step and converges.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::to_value;
use tracing::{debug, info};

use crate::application::errors::IngestError;
use crate::domain::catalog::{
    LatestPointerPayload, RuleDefinition, RulesLatestRecord, RulesPackPayload, RulesPackRecord,
};
use crate::domain::identity;
use crate::domain::report::format_utc;
use crate::infrastructure::storage::{layout, IndexTable, ObjectStore};
use crate::infrastructure::xml::Element;

/// Summary of a successful rules-catalog ingestion.
#[derive(Debug, Clone)]
pub struct RulesOutcome {
    pub pack_id: String,
    pub rule_count: usize,
}

pub struct RulesCatalogProcessor<'a> {
    pub objects: &'a dyn ObjectStore,
    pub index: &'a dyn IndexTable,
    pub curated_bucket: &'a str,
}

impl RulesCatalogProcessor<'_> {
    pub async fn process(
        &self,
        root: &Element,
        raw: &[u8],
        raw_key: &str,
    ) -> Result<RulesOutcome, IngestError> {
        let rules_by_risk_id = parse_rule_definitions(root);
        let rule_count = rules_by_risk_id.len();

        let pack_id = identity::pack_id(raw);
        let ingested_at = format_utc(Utc::now());
        let curated_key = layout::rules_pack_key(&pack_id);

        let payload = RulesPackPayload {
            pack_id: pack_id.clone(),
            source: layout::SOURCE.to_string(),
            artifact_type: "rules".to_string(),
            ingested_at: ingested_at.clone(),
            raw_key: raw_key.to_string(),
            rule_count,
            rules_by_risk_id,
            schema_version: layout::SCHEMA_VERSION.to_string(),
        };
        self.objects
            .put_json(self.curated_bucket, &curated_key, &to_value(&payload)?)
            .await?;

        let latest = LatestPointerPayload {
            pack_id: pack_id.clone(),
            curated_key: curated_key.clone(),
            updated_at: ingested_at.clone(),
            rule_count,
            schema_version: layout::SCHEMA_VERSION.to_string(),
        };
        self.objects
            .put_json(self.curated_bucket, &layout::rules_latest_key(), &to_value(&latest)?)
            .await?;

        let pack_record = RulesPackRecord {
            pk: layout::rules_pk(),
            sk: layout::rules_pack_sk(&pack_id),
            entity_type: "RULES_PACK".to_string(),
            pack_id: pack_id.clone(),
            curated_key: curated_key.clone(),
            updated_at: ingested_at.clone(),
            rule_count,
            raw_key: raw_key.to_string(),
            schema_version: layout::SCHEMA_VERSION.to_string(),
        };
        self.index.put_item(to_value(&pack_record)?).await?;

        let latest_record = RulesLatestRecord {
            pk: layout::rules_pk(),
            sk: layout::RULES_LATEST_SK.to_string(),
            entity_type: "RULES_LATEST".to_string(),
            pack_id: pack_id.clone(),
            curated_key,
            updated_at: ingested_at,
            rule_count,
            schema_version: layout::SCHEMA_VERSION.to_string(),
        };
        self.index.put_item(to_value(&latest_record)?).await?;

        info!(pack_id = %pack_id, rule_count, "rules catalog processed");
        Ok(RulesOutcome {
            pack_id,
            rule_count,
        })
    }
}

/// Parse every `ExportedRule` element into the `riskId -> rule` mapping.
///
/// Entries lacking a `RiskId` are skipped; malformed entries never abort
/// the batch.
pub fn parse_rule_definitions(root: &Element) -> BTreeMap<String, RuleDefinition> {
    let mut rules = BTreeMap::new();

    for entry in root.children_named("ExportedRule") {
        let Some(risk_id) = entry.child_text("RiskId") else {
            debug!("skipping exported rule without RiskId");
            continue;
        };

        let text = |name: &str| entry.child_text(name).unwrap_or_default().to_string();
        rules.insert(
            risk_id.to_string(),
            RuleDefinition {
                risk_id: risk_id.to_string(),
                title: text("Title"),
                description: text("Description"),
                solution: text("Solution"),
                documentation: text("Documentation"),
                technical_explanation: text("TechnicalExplanation"),
                category: text("Category"),
                model: text("Model"),
                rule_type: text("Type"),
                maturity_level: text("MaturityLevel"),
            },
        );
    }

    rules
}
