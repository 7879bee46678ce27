//! Ingestion handler
//!
//! One invocation processes exactly one uploaded document end-to-end. All
//! shared state lives in the external stores; the service holds nothing but
//! gateway handles and configuration, so any number of invocations may run
//! concurrently.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::classify::{classify, ArtifactKind};
use crate::application::errors::IngestError;
use crate::application::event::extract_object_ref;
use crate::application::report::{ReportOutcome, ReportProcessor};
use crate::application::rules::RulesCatalogProcessor;
use crate::config::IngestConfig;
use crate::infrastructure::storage::{IndexTable, ObjectStore};
use crate::infrastructure::xml::parse_document;

/// Why a document was skipped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Content is not well-formed XML; the bucket may hold unrelated objects
    NotXml,
    /// Valid XML matching neither known artifact schema
    UnknownArtifact,
    /// Report with zero valid finding rows
    NoFindings,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotXml => "Not XML",
            Self::UnknownArtifact => "Unknown artifact",
            Self::NoFindings => "No findings",
        }
    }
}

/// Terminal outcome of one invocation.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    RulesIngested {
        pack_id: String,
        rule_count: usize,
    },
    ReportIngested {
        run_id: Uuid,
        finding_count: usize,
    },
    Skipped(SkipReason),
    /// Unrecognized trigger envelope; reported without any I/O
    MalformedEvent,
}

impl IngestOutcome {
    /// HTTP-style status: 200 processed, 204 no-op, 400 malformed trigger.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RulesIngested { .. } | Self::ReportIngested { .. } => 200,
            Self::Skipped(_) => 204,
            Self::MalformedEvent => 400,
        }
    }

    /// Summary payload returned to the invoker.
    pub fn response(&self) -> Value {
        match self {
            Self::RulesIngested {
                pack_id,
                rule_count,
            } => json!({
                "statusCode": 200,
                "message": "Rules catalog processed",
                "packId": pack_id,
                "ruleCount": rule_count,
            }),
            Self::ReportIngested {
                run_id,
                finding_count,
            } => json!({
                "statusCode": 200,
                "message": "Report processed",
                "runId": run_id,
                "findingCount": finding_count,
            }),
            Self::Skipped(reason) => json!({
                "statusCode": 204,
                "message": reason.message(),
            }),
            Self::MalformedEvent => json!({
                "statusCode": 400,
                "message": "Bad event structure",
            }),
        }
    }
}

/// The ingestion pipeline service.
pub struct IngestService {
    objects: Arc<dyn ObjectStore>,
    index: Arc<dyn IndexTable>,
    settings: IngestConfig,
}

impl IngestService {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        index: Arc<dyn IndexTable>,
        settings: IngestConfig,
    ) -> Self {
        Self {
            objects,
            index,
            settings,
        }
    }

    /// Process one "document appeared in storage" trigger event.
    ///
    /// Content-level irregularities yield skip outcomes; only storage I/O
    /// failures return an error, to be redelivered by the invoking
    /// infrastructure.
    pub async fn handle(&self, event: &Value) -> Result<IngestOutcome, IngestError> {
        let Some(object) = extract_object_ref(event) else {
            warn!("unrecognized trigger event envelope");
            return Ok(IngestOutcome::MalformedEvent);
        };

        info!(bucket = %object.bucket, key = %object.key, "processing uploaded artifact");

        let raw = self.objects.get_object(&object.bucket, &object.key).await?;

        let root = match parse_document(&raw) {
            Ok(root) => root,
            Err(e) => {
                info!(key = %object.key, error = %e, "content is not well-formed XML, ignoring");
                return Ok(IngestOutcome::Skipped(SkipReason::NotXml));
            }
        };

        match classify(&root) {
            ArtifactKind::Rules => {
                let processor = RulesCatalogProcessor {
                    objects: self.objects.as_ref(),
                    index: self.index.as_ref(),
                    curated_bucket: &self.settings.curated_bucket,
                };
                let outcome = processor.process(&root, &raw, &object.key).await?;
                Ok(IngestOutcome::RulesIngested {
                    pack_id: outcome.pack_id,
                    rule_count: outcome.rule_count,
                })
            }
            ArtifactKind::Report => {
                let processor = ReportProcessor {
                    objects: self.objects.as_ref(),
                    index: self.index.as_ref(),
                    settings: &self.settings,
                };
                match processor.process(&root, &raw, &object.key).await? {
                    ReportOutcome::Ingested {
                        run_id,
                        finding_count,
                    } => Ok(IngestOutcome::ReportIngested {
                        run_id,
                        finding_count,
                    }),
                    ReportOutcome::NoFindings => {
                        Ok(IngestOutcome::Skipped(SkipReason::NoFindings))
                    }
                }
            }
            ArtifactKind::Unknown => {
                info!(key = %object.key, "unknown artifact shape, ignoring");
                Ok(IngestOutcome::Skipped(SkipReason::UnknownArtifact))
            }
        }
    }
}
