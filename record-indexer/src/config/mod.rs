//! Configuration for the record indexer.
//!
//! Values come from the environment (optionally loaded from `.env`) and can
//! be overridden on the command line.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::str::FromStr;

use record_indexer_pipeline::source::DEFAULT_REGION;
use tracing_subscriber::EnvFilter;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" | "" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub opensearch_url: String,
    /// Index override; each command has its own default.
    pub index: Option<String>,
    pub aws_region: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_NAME`: Target index (default: per command)
    /// - `AWS_REGION`: Region of the input bucket (default: ca-central-1)
    /// - `LOG_FORMAT`: `json` for JSON logs (default: pretty)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            opensearch_url: non_empty("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            index: non_empty("INDEX_NAME"),
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            log_format: non_empty("LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Apply command line overrides.
    pub fn with_overrides(mut self, opensearch_url: Option<String>, index: Option<String>) -> Self {
        if let Some(url) = opensearch_url {
            self.opensearch_url = url;
        }
        if index.is_some() {
            self.index = index;
        }
        self
    }

    /// The configured index, or `default` when none is set.
    pub fn index_or(&self, default: &str) -> String {
        self.index.clone().unwrap_or_else(|| default.to_string())
    }
}

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
