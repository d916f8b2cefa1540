mod enrich;
mod ingest;
mod retention;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sentinel_core::AppConfig;
use sentinel_loader::SourceKind;
use sentinel_store::EsClient;

use crate::enrich::EnrichCommands;
use crate::retention::RetentionCommands;

#[derive(Debug, Parser)]
#[command(name = "sentinel-cli")]
#[command(about = "Corpus ingest, enrichment and retention")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a CSV/JSON/NDJSON file or JSON endpoint into the index
    Ingest {
        /// File path or http(s) URL
        source: String,

        /// Source kind; inferred from the extension or scheme when omitted
        #[arg(long)]
        kind: Option<SourceKind>,

        /// Create the index with the record mapping if it does not exist
        #[arg(long)]
        create_index: bool,
    },
    /// Derive weapon terms and sentiment for stored records
    Enrich {
        #[command(subcommand)]
        command: EnrichCommands,
    },
    /// Inspect or apply the retention rule
    Retention {
        #[command(subcommand)]
        command: RetentionCommands,
    },
    /// Ingest (optional), enrich everything, then apply retention
    Run {
        /// File path or http(s) URL to ingest first
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        kind: Option<SourceKind>,

        /// Leave records in place after enrichment
        #[arg(long)]
        skip_retention: bool,
    },
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("sentinel-cli: run with --help to list commands");
        return Ok(());
    };

    let config = sentinel_core::load_app_config()?;
    init_tracing(&config)?;
    let store = EsClient::from_app_config(&config)?;

    match command {
        Commands::Ingest {
            source,
            kind,
            create_index,
        } => {
            ingest::run_ingest(&config, &store, &source, kind, create_index).await?;
        }
        Commands::Enrich { command } => enrich::run_enrich(&config, &store, command).await?,
        Commands::Retention { command } => retention::run_retention(&store, &command).await?,
        Commands::Run {
            source,
            kind,
            skip_retention,
        } => {
            if let Some(source) = source {
                ingest::run_ingest(&config, &store, &source, kind, true).await?;
            }
            enrich::run_enrich(&config, &store, EnrichCommands::All).await?;
            if skip_retention {
                println!("retention skipped");
            } else {
                retention::apply(&store).await;
            }
        }
    }

    Ok(())
}
