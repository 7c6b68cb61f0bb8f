//! Command line definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use record_indexer_pipeline::{IndexMode, PipelineConfig, QueueCapacity};

#[derive(Parser, Debug)]
#[command(name = "record-indexer")]
#[command(about = "Load CSV datasets into OpenSearch with a pool of bulk uploaders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// OpenSearch URL (overrides OPENSEARCH_URL)
    #[arg(long, global = true)]
    pub opensearch_url: Option<String>,

    /// Target index (overrides INDEX_NAME)
    #[arg(long, global = true)]
    pub index: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index an earthquake catalog CSV file
    Earthquakes(EarthquakeArgs),
    /// Index the leading bytes of a network flow CSV stored in S3
    Netflow(NetflowArgs),
    /// Save the leading bytes of an S3 object to a local file
    Download(DownloadArgs),
    /// Run a match query and print the hits
    Search(SearchArgs),
}

/// Options shared by the ingest commands.
#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Number of concurrent uploaders
    pub workers: usize,

    /// Records per batch
    pub batch_size: usize,

    /// Write mode (bulk|single)
    #[arg(long, default_value_t = IndexMode::Bulk)]
    pub mode: IndexMode,

    /// Dispatch queue capacity, 0 for unbounded (default: 2 x workers)
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Per-request timeout in seconds, 0 to wait indefinitely
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Create the index with its mappings before loading
    #[arg(long)]
    pub create_index: bool,
}

impl IngestArgs {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Pipeline configuration for these options.
    pub fn pipeline_config(&self, index: &str) -> PipelineConfig {
        let mut config = PipelineConfig::new(index, self.workers, self.batch_size)
            .with_mode(self.mode)
            .with_request_timeout(self.request_timeout());
        if let Some(size) = self.queue_capacity {
            config = config.with_queue_capacity(QueueCapacity::from_size(size));
        }
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct EarthquakeArgs {
    #[command(flatten)]
    pub ingest: IngestArgs,

    /// Catalog file
    #[arg(long, default_value = "database.csv")]
    pub file: PathBuf,

    /// Stop after this many accepted records, 0 for all
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct NetflowArgs {
    /// S3 bucket
    pub bucket: String,

    /// Object key
    pub key: String,

    /// KiB of the object to load
    pub kib: u64,

    #[command(flatten)]
    pub ingest: IngestArgs,

    /// AWS region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// S3 bucket
    pub bucket: String,

    /// Object key
    pub key: String,

    /// KiB of the object to download
    pub kib: u64,

    /// Destination file
    pub file: PathBuf,

    /// AWS region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Field to match on
    pub field: String,

    /// Value to match
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_earthquakes() {
        let cli = Cli::try_parse_from([
            "record-indexer",
            "earthquakes",
            "4",
            "1000",
            "--limit",
            "500",
            "--queue-capacity",
            "0",
        ])
        .unwrap();

        let Command::Earthquakes(args) = cli.command else {
            panic!("expected earthquakes command");
        };
        assert_eq!(args.ingest.workers, 4);
        assert_eq!(args.ingest.batch_size, 1000);
        assert_eq!(args.limit, 500);
        assert_eq!(args.file, PathBuf::from("database.csv"));

        let config = args.ingest.pipeline_config("earthquake_bulk");
        assert_eq!(config.queue_capacity, QueueCapacity::Unbounded);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_netflow() {
        let cli = Cli::try_parse_from([
            "record-indexer",
            "--index",
            "flows",
            "netflow",
            "cse-cic-ids2018",
            "Processed Traffic Data/Friday-02-03-2018.csv",
            "512",
            "2",
            "100",
            "--mode",
            "single",
            "--timeout-secs",
            "0",
        ])
        .unwrap();

        assert_eq!(cli.index.as_deref(), Some("flows"));
        let Command::Netflow(args) = cli.command else {
            panic!("expected netflow command");
        };
        assert_eq!(args.kib, 512);
        assert_eq!(args.ingest.mode, IndexMode::Single);
        assert_eq!(args.ingest.request_timeout(), None);
        assert_eq!(
            args.ingest.pipeline_config("flows").queue_capacity,
            QueueCapacity::Bounded(4)
        );
    }

    #[test]
    fn test_negative_batch_size_is_rejected() {
        let result = Cli::try_parse_from(["record-indexer", "earthquakes", "4", "-5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result =
            Cli::try_parse_from(["record-indexer", "earthquakes", "4", "10", "--mode", "stream"]);
        assert!(result.is_err());
    }
}
