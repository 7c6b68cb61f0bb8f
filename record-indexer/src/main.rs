use clap::Parser;
use tracing::error;

use record_indexer::cli::Cli;
use record_indexer::config::init_tracing;
use record_indexer::{commands, Settings};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::from_env().with_overrides(cli.opensearch_url.clone(), cli.index.clone());
    init_tracing(settings.log_format);

    if let Err(e) = commands::run(cli.command, &settings).await {
        error!(error = %e, "Record indexer failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
