//! Report processor
//!
//! Turns one healthcheck report into a run summary, per-finding index
//! entries, and a curated snapshot. Enrichment against the latest rules
//! pack is best-effort: a report processed while no pack exists (or
//! concurrently with a pack update) still yields valid, un-enriched
//! findings.

use std::collections::BTreeMap;

use serde_json::{to_value, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::errors::IngestError;
use crate::config::IngestConfig;
use crate::domain::catalog::{RuleDefinition, RulesPackPayload};
use crate::domain::identity;
use crate::domain::report::{
    format_utc, normalize_domain, normalize_generation_date, FindingIndexRecord, FindingRecord,
    Remediation, ReportRow, ResourceDetails, ResourceRef, RunIndexRecord, RunRecord,
    RunSnapshotPayload, RunStats, SeverityBlock, StandardizedFinding,
    STANDARDIZED_SCHEMA_VERSION,
};
use crate::domain::severity::severity_for_raw_points;
use crate::infrastructure::storage::{layout, IndexTable, ObjectStore};
use crate::infrastructure::xml::Element;

/// Human-readable source name used for synthetic finding titles.
const SOURCE_DISPLAY: &str = "PingCastle";

/// Outcome of report processing.
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    Ingested { run_id: Uuid, finding_count: usize },
    /// Zero valid rows: nothing is written, preventing empty-run pollution
    /// of the index.
    NoFindings,
}

pub struct ReportProcessor<'a> {
    pub objects: &'a dyn ObjectStore,
    pub index: &'a dyn IndexTable,
    pub settings: &'a IngestConfig,
}

impl ReportProcessor<'_> {
    pub async fn process(
        &self,
        root: &Element,
        raw: &[u8],
        raw_key: &str,
    ) -> Result<ReportOutcome, IngestError> {
        let generation_date_utc = format_utc(normalize_generation_date(
            root.descendant_text("GenerationDate"),
        ));
        let generation_date = root
            .descendant_text("GenerationDate")
            .map(str::to_string)
            .unwrap_or_else(|| generation_date_utc.clone());
        let domain = normalize_domain(root.descendant_text("DomainFQDN"));

        // Deterministic run identifier from the content hash: identical
        // report bytes always produce the same run, so redelivered trigger
        // events overwrite rather than duplicate.
        let run_id = identity::run_id(layout::SOURCE, raw);

        let (rules_pack_id, rules_by_risk_id) = self.load_latest_rules_pack().await;
        if rules_pack_id.is_none() {
            info!("no rules pack available, findings will not be enriched");
        }

        let rows = parse_report_rows(root);
        if rows.is_empty() {
            info!(run_id = %run_id, domain = %domain, "report has no valid risk rules, nothing to ingest");
            return Ok(ReportOutcome::NoFindings);
        }

        let product_arn = format!(
            "arn:aws:securityhub:{region}:{account}:product/{account}/default",
            region = self.settings.region,
            account = self.settings.account_id,
        );

        let mut stats = RunStats::default();
        let mut finding_records = Vec::with_capacity(rows.len());
        let mut finding_index_records = Vec::with_capacity(rows.len());

        for row in &rows {
            let rule = rules_by_risk_id.get(&row.risk_id);
            let (label, normalized) = severity_for_raw_points(&row.points);
            stats.record(label);

            let finding_id = identity::finding_id(layout::SOURCE, &run_id, &row.risk_id);
            let title = rule
                .map(|r| r.title.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} {}", SOURCE_DISPLAY, row.risk_id));
            let description = rule
                .map(|r| r.description.as_str())
                .filter(|d| !d.is_empty())
                .unwrap_or(&row.rationale)
                .to_string();
            let remediation = rule
                .map(|r| r.solution.as_str())
                .filter(|s| !s.is_empty())
                .map(Remediation::with_text);

            let standardized = StandardizedFinding {
                schema_version: STANDARDIZED_SCHEMA_VERSION.to_string(),
                id: format!("adwatch:{}", finding_id),
                product_arn: product_arn.clone(),
                generator_id: format!("adwatch/{}", layout::SOURCE),
                aws_account_id: self.settings.account_id.clone(),
                types: vec!["Software and Configuration Checks/Vulnerabilities".to_string()],
                created_at: generation_date_utc.clone(),
                updated_at: generation_date_utc.clone(),
                severity: SeverityBlock {
                    label,
                    normalized,
                    original: row.points.clone(),
                },
                title: title.clone(),
                description,
                resources: vec![ResourceRef {
                    resource_type: "Other".to_string(),
                    id: format!("ad://domain/{}", domain),
                    partition: "aws".to_string(),
                    details: ResourceDetails {
                        other: BTreeMap::from([("DomainFQDN".to_string(), domain.clone())]),
                    },
                }],
                product_fields: self.product_fields(
                    row,
                    &run_id,
                    &domain,
                    &generation_date,
                    &generation_date_utc,
                    raw_key,
                    rules_pack_id.as_deref(),
                ),
                remediation,
            };

            finding_records.push(FindingRecord {
                pk: layout::run_pk(&run_id),
                sk: layout::finding_sk(&finding_id),
                entity_type: "FINDING".to_string(),
                run_id,
                finding_id,
                source: layout::SOURCE.to_string(),
                domain: domain.clone(),
                risk_id: row.risk_id.clone(),
                severity_label: label,
                title: title.clone(),
                standardized: standardized.clone(),
                schema_version: layout::SCHEMA_VERSION.to_string(),
            });
            finding_index_records.push(FindingIndexRecord {
                pk: layout::finding_pk(&finding_id),
                sk: layout::META_SK.to_string(),
                entity_type: "FINDING_INDEX".to_string(),
                run_id,
                finding_id,
                source: layout::SOURCE.to_string(),
                domain: domain.clone(),
                risk_id: row.risk_id.clone(),
                severity_label: label,
                title,
                standardized,
                schema_version: layout::SCHEMA_VERSION.to_string(),
            });
        }

        let finding_count = finding_records.len();
        debug_assert_eq!(stats.total() as usize, finding_count);

        let run_record = RunRecord {
            pk: layout::run_pk(&run_id),
            sk: layout::META_SK.to_string(),
            entity_type: "RUN".to_string(),
            run_id,
            source: layout::SOURCE.to_string(),
            domain: domain.clone(),
            generation_date: generation_date.clone(),
            generation_date_utc: generation_date_utc.clone(),
            created_at: generation_date_utc.clone(),
            raw_key: raw_key.to_string(),
            rules_pack_id: rules_pack_id.clone(),
            finding_count,
            stats,
            schema_version: layout::SCHEMA_VERSION.to_string(),
        };
        let run_index_record = RunIndexRecord {
            pk: layout::runs_index_pk(),
            sk: layout::run_index_sk(&generation_date_utc, &run_id),
            entity_type: "RUN_INDEX".to_string(),
            run_id,
            source: layout::SOURCE.to_string(),
            domain: domain.clone(),
            generation_date: generation_date.clone(),
            generation_date_utc: generation_date_utc.clone(),
            finding_count,
            schema_version: layout::SCHEMA_VERSION.to_string(),
        };

        // One logical batch: run summary, run index, both record families
        // per finding. The store gives no cross-partition transaction; a
        // partial batch replayed under these deterministic keys converges.
        let mut items: Vec<Value> = Vec::with_capacity(2 + finding_count * 2);
        items.push(to_value(&run_record)?);
        items.push(to_value(&run_index_record)?);
        for record in &finding_records {
            items.push(to_value(record)?);
        }
        for record in &finding_index_records {
            items.push(to_value(record)?);
        }
        self.index.batch_put(items).await?;

        let snapshot = RunSnapshotPayload {
            run_id,
            source: layout::SOURCE.to_string(),
            domain: domain.clone(),
            generation_date,
            generation_date_utc,
            raw_key: raw_key.to_string(),
            rules_pack_id,
            finding_count,
            stats,
            findings: finding_records
                .into_iter()
                .map(|record| record.standardized)
                .collect(),
            schema_version: layout::SCHEMA_VERSION.to_string(),
        };
        self.objects
            .put_json(
                &self.settings.curated_bucket,
                &layout::run_snapshot_key(&run_id),
                &to_value(&snapshot)?,
            )
            .await?;

        info!(run_id = %run_id, domain = %domain, finding_count, "report processed");
        Ok(ReportOutcome::Ingested {
            run_id,
            finding_count,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn product_fields(
        &self,
        row: &ReportRow,
        run_id: &Uuid,
        domain: &str,
        generation_date: &str,
        generation_date_utc: &str,
        raw_key: &str,
        rules_pack_id: Option<&str>,
    ) -> BTreeMap<String, String> {
        BTreeMap::from([
            // Internal stable fields (namespaced)
            ("adwatch.source".to_string(), layout::SOURCE.to_string()),
            ("adwatch.runId".to_string(), run_id.to_string()),
            ("adwatch.domain".to_string(), domain.to_string()),
            (
                "adwatch.generationDate".to_string(),
                generation_date.to_string(),
            ),
            (
                "adwatch.generationDateUtc".to_string(),
                generation_date_utc.to_string(),
            ),
            ("adwatch.rawKey".to_string(), raw_key.to_string()),
            // Source-tool-specific fields
            ("pingcastle.riskId".to_string(), row.risk_id.clone()),
            ("pingcastle.category".to_string(), row.category.clone()),
            ("pingcastle.model".to_string(), row.model.clone()),
            ("pingcastle.points".to_string(), row.points.clone()),
            ("pingcastle.rationale".to_string(), row.rationale.clone()),
            (
                "pingcastle.rulesPackId".to_string(),
                rules_pack_id.unwrap_or_default().to_string(),
            ),
        ])
    }

    /// Load the latest rules pack: pointer record first, then its
    /// object-storage payload. Every failure mode degrades to un-enriched
    /// findings; this read is never fatal.
    async fn load_latest_rules_pack(
        &self,
    ) -> (Option<String>, BTreeMap<String, RuleDefinition>) {
        let pointer = match self
            .index
            .get_item(&layout::rules_pk(), layout::RULES_LATEST_SK)
            .await
        {
            Ok(Some(item)) => item,
            Ok(None) => return (None, BTreeMap::new()),
            Err(e) => {
                warn!(error = %e, "failed to read latest rules pointer, continuing without enrichment");
                return (None, BTreeMap::new());
            }
        };

        let pack_id = pointer
            .get("packId")
            .and_then(Value::as_str)
            .map(str::to_string);
        let Some(curated_key) = pointer.get("curatedKey").and_then(Value::as_str) else {
            return (pack_id, BTreeMap::new());
        };

        let raw = match self
            .objects
            .get_object(&self.settings.curated_bucket, curated_key)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to read latest rules pack, continuing without enrichment");
                return (pack_id, BTreeMap::new());
            }
        };

        match serde_json::from_slice::<RulesPackPayload>(&raw) {
            Ok(payload) => (pack_id, payload.rules_by_risk_id),
            Err(e) => {
                warn!(error = %e, "latest rules pack payload is unreadable, continuing without enrichment");
                (pack_id, BTreeMap::new())
            }
        }
    }
}

/// Extract per-rule rows from the risk-rules collection.
///
/// Rows missing a rule identifier are skipped individually and never abort
/// the batch.
pub fn parse_report_rows(root: &Element) -> Vec<ReportRow> {
    let Some(risk_rules) = root.descendant("RiskRules") else {
        return Vec::new();
    };

    risk_rules
        .children_named("HealthcheckRiskRule")
        .filter_map(|entry| {
            let risk_id = entry.child_text("RiskId")?;
            let text = |name: &str| entry.child_text(name).unwrap_or_default().to_string();
            Some(ReportRow {
                risk_id: risk_id.to_string(),
                category: text("Category"),
                model: text("Model"),
                points: text("Points"),
                rationale: text("Rationale"),
            })
        })
        .collect()
}
