use clap::Subcommand;

use sentinel_core::AppConfig;
use sentinel_enrich::{EnrichOptions, Enricher, PassSummary, SentimentScorer, Vocabulary};
use sentinel_store::EsClient;

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum EnrichCommands {
    /// Tag records with the canonical weapon terms their text mentions
    Weapons,
    /// Score records that have no sentiment yet
    Sentiment,
    /// Weapons pass, then sentiment pass
    All,
}

pub(crate) async fn run_enrich(
    config: &AppConfig,
    store: &EsClient,
    command: EnrichCommands,
) -> anyhow::Result<()> {
    let loaded = Vocabulary::load(&config.weapons_path);
    if let Some(warning) = &loaded.warning {
        println!("warning: {warning}; weapons pass will be skipped");
    }
    let scorer = SentimentScorer::from_optional_path(config.sentiment_lexicon_path.as_deref())?;
    let enricher = Enricher::new(
        store,
        &loaded.vocabulary,
        &scorer,
        EnrichOptions::from_app_config(config),
    );

    let summaries = match command {
        EnrichCommands::Weapons => vec![enricher.enrich_weapons().await],
        EnrichCommands::Sentiment => vec![enricher.enrich_sentiment().await],
        EnrichCommands::All => {
            let run = enricher.run_all().await;
            vec![run.weapons, run.sentiment]
        }
    };

    for summary in &summaries {
        print_summary(summary);
    }

    if let Some(aborted) = summaries.iter().find(|s| s.is_aborted()) {
        anyhow::bail!(
            "{} pass aborted: {}",
            aborted.pass,
            aborted.aborted.as_deref().unwrap_or("selection failed")
        );
    }
    Ok(())
}

fn print_summary(summary: &PassSummary) {
    println!(
        "{}: selected={} skipped={} submitted={} updated={} failed={} chunks={} refreshed={} state={:?}",
        summary.pass,
        summary.selected,
        summary.skipped,
        summary.submitted,
        summary.updated,
        summary.failed,
        summary.chunks.len(),
        summary.refreshed,
        summary.state,
    );
    for chunk in summary.chunks.iter().filter(|c| !c.failures.is_empty()) {
        for failure in &chunk.failures {
            println!(
                "  chunk {} id={} status={} reason={}",
                chunk.index,
                failure.id.as_deref().unwrap_or("-"),
                failure.status,
                failure.reason
            );
        }
    }
}
