use clap::Subcommand;

use sentinel_enrich::RetentionFilter;
use sentinel_store::DocumentStore;

#[derive(Debug, Subcommand)]
pub enum RetentionCommands {
    /// Count the records the rule would delete and show a sample
    Preview {
        /// Number of matching records to show
        #[arg(long, default_value_t = 10)]
        sample: usize,
    },
    /// Delete every record the rule matches
    Apply {
        /// Confirm the irreversible delete
        #[arg(long)]
        yes: bool,
    },
}

pub(crate) async fn run_retention(
    store: &dyn DocumentStore,
    command: &RetentionCommands,
) -> anyhow::Result<()> {
    match command {
        RetentionCommands::Preview { sample } => {
            let preview = RetentionFilter::new(store).preview(*sample).await?;
            println!("retention would delete {} records", preview.count);
            for record in &preview.sample {
                println!(
                    "  {}: {}",
                    record.id,
                    record.text.as_deref().unwrap_or("<no text>")
                );
            }
        }
        RetentionCommands::Apply { yes } => {
            if !*yes {
                anyhow::bail!("retention apply deletes records permanently; pass --yes to confirm");
            }
            apply(store).await;
        }
    }
    Ok(())
}

pub(crate) async fn apply(store: &dyn DocumentStore) -> u64 {
    let deleted = RetentionFilter::new(store).apply().await;
    println!("retention deleted {deleted} records");
    deleted
}
