//! stac-ingest CLI
//!
//! Local execution entry point. For AWS Lambda, use `stac-ingest-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stac_ingest::{
    config,
    error::Result,
    fetch::Fetcher,
    index::{HttpSearchIndex, SearchIndex},
    models::IngestRequest,
    pipeline,
};

/// stac-ingest - STAC catalog ingestion
#[derive(Parser, Debug)]
#[command(
    name = "stac-ingest",
    version,
    about = "Crawls STAC catalog trees into a search index"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a catalog tree and ingest every document into the index
    Ingest {
        /// Root catalog: local path, s3:// URI or HTTP(S) URL
        root: String,

        /// Ingest only the root document, never expanding children
        #[arg(long)]
        no_recursive: bool,

        /// Stop descending once a Collection is reached
        #[arg(long)]
        collections_only: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_or_default(&cli.config);

    match cli.command {
        Command::Ingest {
            root,
            no_recursive,
            collections_only,
        } => {
            config.validate()?;

            let request = IngestRequest {
                root,
                recursive: !no_recursive,
                collections_only,
            };

            let fetcher = Arc::new(Fetcher::from_config(&config.fetch).await?);
            let index: Arc<dyn SearchIndex> =
                Arc::new(HttpSearchIndex::from_config(&config.index)?);

            let summary = pipeline::run_ingest(&request, fetcher, index, &config).await?;
            tracing::info!(
                "Ingest complete: {} emitted, {} written, {} skipped, {} batch(es)",
                summary.documents_emitted,
                summary.documents_written,
                summary.skipped(),
                summary.batches_flushed
            );
        }

        Command::Validate => {
            config.validate()?;
            tracing::info!("Configuration OK");
            tracing::info!("  search endpoint: {}", config.index.url);
            tracing::info!("  collections index: {}", config.index.collections);
            tracing::info!("  items index: {}", config.index.items);
            tracing::info!("  batch size: {}", config.sink.batch_size);
            tracing::info!("  max fetches in flight: {}", config.fetch.max_in_flight);
        }
    }

    Ok(())
}
