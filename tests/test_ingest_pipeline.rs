//! End-to-end ingestion pipeline tests over in-memory gateways

use std::sync::Arc;

use serde_json::{json, Value};

use adwatch_ingest::application::{IngestOutcome, IngestService, SkipReason};
use adwatch_ingest::config::IngestConfig;
use adwatch_ingest::infrastructure::storage::memory::{InMemoryIndexTable, InMemoryObjectStore};
use adwatch_ingest::infrastructure::storage::IndexTable;

const RAW_BUCKET: &str = "raw-bucket";
const CURATED_BUCKET: &str = "curated-bucket";

const RULES_XML: &[u8] = b"<ArrayOfExportedRule>\
    <ExportedRule>\
        <RiskId>S-ADRegistration</RiskId>\
        <Title>Machine account registration is open</Title>\
        <Description>Any authenticated user can register machine accounts.</Description>\
        <Solution>Set ms-DS-MachineAccountQuota to 0.</Solution>\
        <Category>StaleObjects</Category>\
        <Model>Provisioning</Model>\
        <Type>AD</Type>\
        <MaturityLevel>2</MaturityLevel>\
    </ExportedRule>\
    <ExportedRule>\
        <Title>Entry without a risk id</Title>\
    </ExportedRule>\
    <ExportedRule>\
        <RiskId>S-DC-SubnetMissing</RiskId>\
        <Title>Subnets missing from AD sites</Title>\
        <Description>Some subnets are not declared.</Description>\
        <Solution>Declare the missing subnets.</Solution>\
    </ExportedRule>\
</ArrayOfExportedRule>";

const REPORT_XML: &[u8] = b"<HealthcheckData>\
    <GenerationDate>2025-12-18T14:32:25.6874739-05:00</GenerationDate>\
    <DomainFQDN>Contoso.LOCAL.</DomainFQDN>\
    <RiskRules>\
        <HealthcheckRiskRule>\
            <RiskId>S-ADRegistration</RiskId>\
            <Category>StaleObjects</Category>\
            <Model>Provisioning</Model>\
            <Points>30</Points>\
            <Rationale>MachineAccountQuota is 10</Rationale>\
        </HealthcheckRiskRule>\
        <HealthcheckRiskRule>\
            <RiskId>S-DC-SubnetMissing</RiskId>\
            <Category>StaleObjects</Category>\
            <Model>NetworkTopography</Model>\
            <Points>5</Points>\
            <Rationale>2 subnets are missing</Rationale>\
        </HealthcheckRiskRule>\
        <HealthcheckRiskRule>\
            <RiskId>A-NoPoints</RiskId>\
            <Points>abc</Points>\
            <Rationale>Unscored observation</Rationale>\
        </HealthcheckRiskRule>\
    </RiskRules>\
</HealthcheckData>";

const EMPTY_REPORT_XML: &[u8] = b"<HealthcheckData>\
    <GenerationDate>2025-12-18T14:32:25.6874739-05:00</GenerationDate>\
    <DomainFQDN>contoso.local</DomainFQDN>\
    <RiskRules>\
        <HealthcheckRiskRule><Points>10</Points></HealthcheckRiskRule>\
    </RiskRules>\
</HealthcheckData>";

struct Harness {
    service: IngestService,
    objects: InMemoryObjectStore,
    index: InMemoryIndexTable,
}

fn harness() -> Harness {
    let objects = InMemoryObjectStore::new();
    let index = InMemoryIndexTable::new();
    let settings = IngestConfig {
        curated_bucket: CURATED_BUCKET.to_string(),
        table_name: "adwatch-main".to_string(),
        account_id: "123456789012".to_string(),
        region: "ca-central-1".to_string(),
    };
    let service = IngestService::new(
        Arc::new(objects.clone()),
        Arc::new(index.clone()),
        settings,
    );
    Harness {
        service,
        objects,
        index,
    }
}

fn upload_event(key: &str) -> Value {
    json!({
        "detail": {
            "bucket": {"name": RAW_BUCKET},
            "object": {"key": key}
        }
    })
}

async fn seed_and_ingest(harness: &Harness, key: &str, content: &[u8]) -> IngestOutcome {
    harness.objects.put_raw(RAW_BUCKET, key, content.to_vec()).await;
    harness.service.handle(&upload_event(key)).await.unwrap()
}

#[tokio::test]
async fn rules_catalog_ingestion_writes_pack_and_pointer() {
    let h = harness();
    let outcome = seed_and_ingest(&h, "uploads/PingCastleRules.xml", RULES_XML).await;

    let IngestOutcome::RulesIngested {
        pack_id,
        rule_count,
    } = outcome
    else {
        panic!("expected rules ingestion, got {:?}", outcome);
    };
    // The entry without a RiskId is dropped.
    assert_eq!(rule_count, 2);

    let pack_key = format!("curated/pingcastle/rules/packId={}/rules.json", pack_id);
    let pack: Value =
        serde_json::from_slice(&h.objects.object(CURATED_BUCKET, &pack_key).await.unwrap())
            .unwrap();
    assert_eq!(pack["packId"], pack_id);
    assert_eq!(pack["ruleCount"], 2);
    assert_eq!(
        pack["rulesByRiskId"]["S-ADRegistration"]["solution"],
        "Set ms-DS-MachineAccountQuota to 0."
    );

    let latest: Value = serde_json::from_slice(
        &h.objects
            .object(CURATED_BUCKET, "curated/pingcastle/rules/latest.json")
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(latest["packId"], pack_id);
    assert_eq!(latest["curatedKey"], pack_key);

    let pointer = h
        .index
        .get_item("PINGCASTLE#RULES", "LATEST")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pointer["entityType"], "RULES_LATEST");
    assert_eq!(pointer["packId"], pack_id);
    assert!(h
        .index
        .get_item("PINGCASTLE#RULES", &format!("PACK#{}", pack_id))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn rules_reingestion_is_idempotent_and_pointer_tracks_latest() {
    let h = harness();
    let IngestOutcome::RulesIngested { pack_id: first, .. } =
        seed_and_ingest(&h, "uploads/rules-1.xml", RULES_XML).await
    else {
        panic!("expected rules ingestion");
    };

    let objects_after_first = h.objects.object_count().await;
    let items_after_first = h.index.item_count().await;

    // Byte-identical re-uploads: same pack id, same object and item counts.
    for _ in 0..3 {
        let IngestOutcome::RulesIngested { pack_id, .. } =
            seed_and_ingest(&h, "uploads/rules-1.xml", RULES_XML).await
        else {
            panic!("expected rules ingestion");
        };
        assert_eq!(pack_id, first);
    }
    assert_eq!(h.objects.object_count().await, objects_after_first);
    assert_eq!(h.index.item_count().await, items_after_first);

    // A changed catalog produces a new pack and moves the pointer.
    let mut changed = RULES_XML.to_vec();
    changed.extend_from_slice(b" ");
    let IngestOutcome::RulesIngested { pack_id: second, .. } =
        seed_and_ingest(&h, "uploads/rules-2.xml", &changed).await
    else {
        panic!("expected rules ingestion");
    };
    assert_ne!(second, first);

    let pointer = h
        .index
        .get_item("PINGCASTLE#RULES", "LATEST")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pointer["packId"], second);
}

#[tokio::test]
async fn report_ingestion_enriches_from_latest_pack() {
    let h = harness();
    seed_and_ingest(&h, "uploads/rules.xml", RULES_XML).await;
    let outcome = seed_and_ingest(&h, "uploads/ad_hc_contoso.local.xml", REPORT_XML).await;

    let IngestOutcome::ReportIngested {
        run_id,
        finding_count,
    } = outcome
    else {
        panic!("expected report ingestion, got {:?}", outcome);
    };
    assert_eq!(finding_count, 3);

    let run = h
        .index
        .get_item(&format!("RUN#{}", run_id), "META")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(run["entityType"], "RUN");
    assert_eq!(run["domain"], "contoso.local");
    assert_eq!(run["generationDateUtc"], "2025-12-18T19:32:25.687473Z");
    assert_eq!(run["findingCount"], 3);
    assert_eq!(run["stats"]["CRITICAL"], 1);
    assert_eq!(run["stats"]["LOW"], 1);
    assert_eq!(run["stats"]["INFORMATIONAL"], 1);

    // Enriched finding carries the pack's title/description/solution.
    let findings = h.index.partition(&format!("RUN#{}", run_id)).await;
    let enriched = findings
        .iter()
        .find(|f| f["riskId"] == "S-ADRegistration")
        .unwrap();
    assert_eq!(enriched["severityLabel"], "CRITICAL");
    assert_eq!(enriched["title"], "Machine account registration is open");
    assert_eq!(
        enriched["standardized"]["Description"],
        "Any authenticated user can register machine accounts."
    );
    assert_eq!(
        enriched["standardized"]["Remediation"]["Recommendation"]["Text"],
        "Set ms-DS-MachineAccountQuota to 0."
    );
    assert_eq!(enriched["standardized"]["Severity"]["Normalized"], 90);
    assert_eq!(enriched["standardized"]["Severity"]["Original"], "30");

    // Unscored row maps to informational with the rationale as description.
    let unscored = findings.iter().find(|f| f["riskId"] == "A-NoPoints").unwrap();
    assert_eq!(unscored["severityLabel"], "INFORMATIONAL");
    assert_eq!(
        unscored["standardized"]["Description"],
        "Unscored observation"
    );

    // Inverted index supports direct lookup by finding id.
    let finding_id = enriched["findingId"].as_str().unwrap();
    let direct = h
        .index
        .get_item(&format!("FINDING#{}", finding_id), "META")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(direct["entityType"], "FINDING_INDEX");
    assert_eq!(direct["runId"], run_id.to_string());
}

#[tokio::test]
async fn report_reingestion_reproduces_identical_identifiers() {
    let h = harness();
    seed_and_ingest(&h, "uploads/rules.xml", RULES_XML).await;

    let IngestOutcome::ReportIngested { run_id: first, .. } =
        seed_and_ingest(&h, "uploads/report.xml", REPORT_XML).await
    else {
        panic!("expected report ingestion");
    };
    let items_after_first = h.index.item_count().await;
    let objects_after_first = h.objects.object_count().await;
    let findings_first: Vec<String> = h
        .index
        .partition(&format!("RUN#{}", first))
        .await
        .iter()
        .map(|f| f["sk"].as_str().unwrap().to_string())
        .collect();

    for _ in 0..3 {
        let IngestOutcome::ReportIngested { run_id, .. } =
            seed_and_ingest(&h, "uploads/report.xml", REPORT_XML).await
        else {
            panic!("expected report ingestion");
        };
        assert_eq!(run_id, first);
    }

    // Re-delivery converges: same run, same finding keys, no growth.
    assert_eq!(h.index.item_count().await, items_after_first);
    assert_eq!(h.objects.object_count().await, objects_after_first);
    let findings_again: Vec<String> = h
        .index
        .partition(&format!("RUN#{}", first))
        .await
        .iter()
        .map(|f| f["sk"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(findings_again, findings_first);
}

#[tokio::test]
async fn report_without_pack_falls_back_to_synthetic_titles() {
    let h = harness();
    let IngestOutcome::ReportIngested { run_id, .. } =
        seed_and_ingest(&h, "uploads/report.xml", REPORT_XML).await
    else {
        panic!("expected report ingestion");
    };

    let findings = h.index.partition(&format!("RUN#{}", run_id)).await;
    let finding = findings
        .iter()
        .find(|f| f["riskId"] == "S-ADRegistration")
        .unwrap();
    assert_eq!(finding["title"], "PingCastle S-ADRegistration");
    assert_eq!(
        finding["standardized"]["Description"],
        "MachineAccountQuota is 10"
    );
    assert!(finding["standardized"].get("Remediation").is_none());

    let run = h
        .index
        .get_item(&format!("RUN#{}", run_id), "META")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(run["rulesPackId"], Value::Null);
}

#[tokio::test]
async fn curated_snapshot_matches_run_summary() {
    let h = harness();
    seed_and_ingest(&h, "uploads/rules.xml", RULES_XML).await;
    let IngestOutcome::ReportIngested {
        run_id,
        finding_count,
    } = seed_and_ingest(&h, "uploads/report.xml", REPORT_XML).await
    else {
        panic!("expected report ingestion");
    };

    let snapshot_key = format!(
        "curated/pingcastle/runs/runId={}/findings.standardized.json",
        run_id
    );
    let snapshot: Value =
        serde_json::from_slice(&h.objects.object(CURATED_BUCKET, &snapshot_key).await.unwrap())
            .unwrap();

    assert_eq!(snapshot["runId"], run_id.to_string());
    assert_eq!(snapshot["domain"], "contoso.local");
    assert_eq!(snapshot["findingCount"], finding_count);
    assert_eq!(snapshot["findings"].as_array().unwrap().len(), finding_count);
    assert_eq!(snapshot["rawKey"], "uploads/report.xml");

    // Stats counts sum to the finding count.
    let stats = snapshot["stats"].as_object().unwrap();
    let total: u64 = stats.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, finding_count as u64);
}

#[tokio::test]
async fn run_index_orders_chronologically() {
    let h = harness();

    let early = String::from_utf8_lossy(REPORT_XML)
        .replace("2025-12-18T14:32:25.6874739-05:00", "2025-01-10T08:00:00+01:00");
    let late = String::from_utf8_lossy(REPORT_XML)
        .replace("2025-12-18T14:32:25.6874739-05:00", "2025-06-01T08:00:00+01:00");

    // Ingest out of order; the index sort key restores chronology.
    seed_and_ingest(&h, "uploads/late.xml", late.as_bytes()).await;
    seed_and_ingest(&h, "uploads/early.xml", early.as_bytes()).await;

    let runs = h.index.partition("RUNS#pingcastle").await;
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["generationDateUtc"], "2025-01-10T07:00:00.000000Z");
    assert_eq!(runs[1]["generationDateUtc"], "2025-06-01T07:00:00.000000Z");
    assert!(runs[0]["sk"].as_str().unwrap() < runs[1]["sk"].as_str().unwrap());
}

#[tokio::test]
async fn empty_report_is_a_no_op() {
    let h = harness();
    let outcome = seed_and_ingest(&h, "uploads/empty.xml", EMPTY_REPORT_XML).await;

    assert!(matches!(
        outcome,
        IngestOutcome::Skipped(SkipReason::NoFindings)
    ));
    assert_eq!(outcome.status_code(), 204);
    // No Run record, no snapshot: empty runs never pollute the index.
    assert_eq!(h.index.item_count().await, 0);
    assert!(h
        .objects
        .object(RAW_BUCKET, "uploads/empty.xml")
        .await
        .is_some());
    assert_eq!(h.objects.object_count().await, 1);
}

#[tokio::test]
async fn non_xml_and_unknown_artifacts_are_skipped() {
    let h = harness();

    let outcome = seed_and_ingest(&h, "uploads/readme.txt", b"not xml at all").await;
    assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::NotXml)));

    let outcome = seed_and_ingest(&h, "uploads/other.xml", b"<unrelated><data/></unrelated>").await;
    assert!(matches!(
        outcome,
        IngestOutcome::Skipped(SkipReason::UnknownArtifact)
    ));

    assert_eq!(h.index.item_count().await, 0);
}

#[tokio::test]
async fn malformed_event_is_rejected_without_side_effects() {
    let h = harness();
    let outcome = h.service.handle(&json!({"foo": "bar"})).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::MalformedEvent));
    assert_eq!(outcome.status_code(), 400);
    assert_eq!(h.index.item_count().await, 0);
    assert_eq!(h.objects.object_count().await, 0);
}
