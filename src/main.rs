//! Operator binary: feed one trigger event through the ingestion service.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use adwatch_ingest::application::IngestService;
use adwatch_ingest::infrastructure::storage::aws::{DynamoIndexTable, S3ObjectStore};
use adwatch_ingest::infrastructure::storage::{IndexTable, ObjectStore};
use adwatch_ingest::{init_tracing, Config};

/// Ingest one uploaded PingCastle artifact described by a trigger event.
#[derive(Parser, Debug)]
#[command(name = "adwatch-ingest", version, about)]
struct Args {
    /// Path to the trigger event JSON; reads stdin when omitted
    #[arg(long)]
    event: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.level).context("failed to initialize logging")?;

    let event_text = match &args.event {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read event from stdin")?;
            buffer
        }
    };
    let event: serde_json::Value =
        serde_json::from_str(&event_text).context("trigger event is not valid JSON")?;

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let objects: Arc<dyn ObjectStore> =
        Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&aws_config)));
    let index: Arc<dyn IndexTable> = Arc::new(DynamoIndexTable::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.ingest.table_name.clone(),
    ));

    let service = IngestService::new(objects, index, config.ingest);
    let outcome = service.handle(&event).await?;

    info!(status = outcome.status_code(), "invocation complete");
    println!("{}", serde_json::to_string_pretty(&outcome.response())?);

    Ok(())
}
