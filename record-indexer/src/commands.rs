//! Command implementations.

use std::sync::Arc;
use std::time::Duration;

use record_indexer_pipeline::source::{
    open_earthquakes, parse_network_flows, ObjectFetcher,
};
use record_indexer_pipeline::{Orchestrator, PipelineConfig, RunSummary};
use record_indexer_repository::opensearch::index_config::{
    earthquake_index_settings, network_flow_index_settings, EARTHQUAKE_INDEX, NETWORK_FLOW_INDEX,
};
use record_indexer_repository::opensearch::queries::match_query;
use record_indexer_repository::{DocumentStore, SearchHits};
use record_indexer_shared::Document;
use serde_json::Value;
use tracing::{info, instrument};

use crate::cli::{Command, DownloadArgs, EarthquakeArgs, NetflowArgs, SearchArgs};
use crate::config::{Dependencies, Settings};
use crate::IndexerError;

/// Timeout for one-off requests outside the ingest pipeline.
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a parsed command to completion.
pub async fn run(command: Command, settings: &Settings) -> Result<(), IndexerError> {
    match command {
        Command::Earthquakes(args) => {
            let summary = index_earthquakes(&args, settings).await?;
            println!("{}", format_summary(&summary));
        }
        Command::Netflow(args) => {
            let summary = index_network_flows(&args, settings).await?;
            println!("{}", format_summary(&summary));
        }
        Command::Download(args) => {
            let written = download(&args, settings).await?;
            println!("Downloaded {} bytes to {}", written, args.file.display());
        }
        Command::Search(args) => {
            let deps = Dependencies::new(settings, Some(QUERY_TIMEOUT)).await?;
            let index = settings.index_or(NETWORK_FLOW_INDEX);
            let hits = search(deps.store.as_ref(), &index, &args).await?;
            for line in format_hits(&hits) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Load an earthquake catalog file.
#[instrument(skip_all, fields(file = %args.file.display()))]
pub async fn index_earthquakes(
    args: &EarthquakeArgs,
    settings: &Settings,
) -> Result<RunSummary, IndexerError> {
    let config = args.ingest.pipeline_config(&settings.index_or(EARTHQUAKE_INDEX));
    config.validate()?;

    let deps = Dependencies::new(settings, config.request_timeout).await?;

    let records = open_earthquakes(&args.file, args.limit)?;
    info!(records = records.len(), "Parsed records");

    let index_settings = args.ingest.create_index.then(earthquake_index_settings);
    ingest(deps.store, config, records, index_settings).await
}

/// Load the leading `kib` KiB of a network flow CSV stored in S3.
#[instrument(skip_all, fields(bucket = %args.bucket, key = %args.key, kib = args.kib))]
pub async fn index_network_flows(
    args: &NetflowArgs,
    settings: &Settings,
) -> Result<RunSummary, IndexerError> {
    let config = args.ingest.pipeline_config(&settings.index_or(NETWORK_FLOW_INDEX));
    config.validate()?;

    let deps = Dependencies::new(settings, config.request_timeout).await?;

    let region = args.region.as_deref().unwrap_or(&settings.aws_region);
    let fetcher = ObjectFetcher::s3(&args.bucket, region)?;
    let prefix = fetcher.fetch_prefix(&args.key, args.kib).await?;

    let records = parse_network_flows(&prefix.data, prefix.truncated)?;
    info!(records = records.len(), "Parsed records");

    let index_settings = args.ingest.create_index.then(network_flow_index_settings);
    ingest(deps.store, config, records, index_settings).await
}

/// Save the leading `kib` KiB of an S3 object to a local file.
pub async fn download(args: &DownloadArgs, settings: &Settings) -> Result<u64, IndexerError> {
    let region = args.region.as_deref().unwrap_or(&settings.aws_region);
    let fetcher = ObjectFetcher::s3(&args.bucket, region)?;
    Ok(fetcher.download_to_file(&args.key, args.kib, &args.file).await?)
}

/// Run the pipeline over parsed records.
pub async fn ingest<D: Document>(
    store: Arc<dyn DocumentStore>,
    config: PipelineConfig,
    records: Vec<D>,
    index_settings: Option<Value>,
) -> Result<RunSummary, IndexerError> {
    let orchestrator = Orchestrator::new(store, config)?;

    if let Some(index_settings) = index_settings {
        orchestrator.ensure_index(&index_settings).await?;
    }

    Ok(orchestrator.run(records).await?)
}

/// Match `args.value` against `args.field`.
pub async fn search(
    store: &dyn DocumentStore,
    index: &str,
    args: &SearchArgs,
) -> Result<SearchHits, IndexerError> {
    let query = match_query(&args.field, &args.value);
    Ok(store.search(index, &query).await?)
}

/// Render search results, one line per hit after the header.
pub fn format_hits(hits: &SearchHits) -> Vec<String> {
    let mut lines = Vec::with_capacity(hits.hits.len() + 1);
    lines.push(format!(
        "[200 OK] {} hits; took: {}ms",
        hits.total, hits.took_ms
    ));
    lines.extend(
        hits.hits
            .iter()
            .map(|hit| format!(" * ID={}, {}", hit.id, hit.source)),
    );
    lines
}

/// One-line description of a finished run.
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Indexed {} of {} records in {} batches ({} failed, {} unserializable) in {:?}",
        summary.documents_indexed(),
        summary.records,
        summary.batches,
        summary.documents_failed,
        summary.serialization_failures,
        summary.elapsed
    )
}
