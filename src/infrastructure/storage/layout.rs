//! Storage layout: every object key and index pk/sk format in one place

use uuid::Uuid;

/// Source system identifier for all artifacts this pipeline ingests.
pub const SOURCE: &str = "pingcastle";

/// Schema version stamped on every persisted record and payload.
pub const SCHEMA_VERSION: &str = "v0.1";

/// Content-addressed location of a full rules pack payload.
pub fn rules_pack_key(pack_id: &str) -> String {
    format!("curated/{}/rules/packId={}/rules.json", SOURCE, pack_id)
}

/// Fixed location of the latest-pack pointer payload.
pub fn rules_latest_key() -> String {
    format!("curated/{}/rules/latest.json", SOURCE)
}

/// Run-scoped location of the curated findings snapshot.
pub fn run_snapshot_key(run_id: &Uuid) -> String {
    format!(
        "curated/{}/runs/runId={}/findings.standardized.json",
        SOURCE, run_id
    )
}

/// Partition holding all rules-catalog records of this source.
pub fn rules_pk() -> String {
    format!("{}#RULES", SOURCE.to_uppercase())
}

pub fn rules_pack_sk(pack_id: &str) -> String {
    format!("PACK#{}", pack_id)
}

/// Sort key of the mutable latest pointer record.
pub const RULES_LATEST_SK: &str = "LATEST";

/// Sort key of run and finding-index metadata records.
pub const META_SK: &str = "META";

pub fn run_pk(run_id: &Uuid) -> String {
    format!("RUN#{}", run_id)
}

pub fn finding_sk(finding_id: &Uuid) -> String {
    format!("FINDING#{}", finding_id)
}

pub fn finding_pk(finding_id: &Uuid) -> String {
    format!("FINDING#{}", finding_id)
}

/// Partition of the chronological run index for this source.
pub fn runs_index_pk() -> String {
    format!("RUNS#{}", SOURCE)
}

/// Sort key of a run-index record: UTC timestamp first so lexical order
/// matches chronological order for range queries.
pub fn run_index_sk(generation_date_utc: &str, run_id: &Uuid) -> String {
    format!("{}#RUN#{}", generation_date_utc, run_id)
}
