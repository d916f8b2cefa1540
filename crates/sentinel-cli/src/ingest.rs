use std::time::Duration;

use serde_json::Value;

use sentinel_core::AppConfig;
use sentinel_loader::{Loader, RecordMapping, SourceKind};
use sentinel_store::DocumentStore;

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct IngestSummary {
    pub rows: usize,
    pub inserted: usize,
    pub failed: usize,
}

/// Load `source`, map each row to a record and insert in `chunk_size` batches.
///
/// A failed batch is counted and skipped; the remaining batches still go out.
pub(crate) async fn run_ingest(
    config: &AppConfig,
    store: &dyn DocumentStore,
    source: &str,
    kind: Option<SourceKind>,
    create_index: bool,
) -> anyhow::Result<IngestSummary> {
    if create_index {
        let created = store.ensure_index().await?;
        if created {
            println!("created index {}", config.index);
        }
    }

    let loader = Loader::new(Duration::from_secs(config.es_request_timeout_secs))?;
    let rows = loader.load(source, kind).await?;
    let mapping = RecordMapping::from_app_config(config);
    let docs: Vec<Value> = rows.into_iter().map(|row| mapping.to_record(row)).collect();

    let summary = insert_in_chunks(store, &docs, config.chunk_size).await;
    if let Err(e) = store.refresh().await {
        tracing::warn!(error = %e, "refresh after ingest failed");
    }

    println!(
        "ingest {source}: rows={} inserted={} failed={}",
        summary.rows, summary.inserted, summary.failed
    );
    Ok(summary)
}

async fn insert_in_chunks(
    store: &dyn DocumentStore,
    docs: &[Value],
    chunk_size: usize,
) -> IngestSummary {
    let mut summary = IngestSummary {
        rows: docs.len(),
        ..IngestSummary::default()
    };

    for (index, chunk) in docs.chunks(chunk_size.max(1)).enumerate() {
        match store.insert_many(chunk).await {
            Ok(outcome) => {
                for failure in &outcome.failed {
                    tracing::warn!(
                        chunk = index,
                        status = failure.status,
                        reason = %failure.reason,
                        "record rejected"
                    );
                }
                summary.inserted += outcome.success;
                summary.failed += outcome.failed.len();
            }
            Err(e) => {
                tracing::error!(chunk = index, error = %e, "insert batch failed");
                summary.failed += chunk.len();
            }
        }
    }

    summary
}
