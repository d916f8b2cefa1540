//! Enrichment passes: traverse the corpus in bounded pages, derive new fields,
//! and write them back as chunked partial updates.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use sentinel_core::fields;
use sentinel_store::{
    BoolQuery, BulkFailure, DocumentStore, Hit, Query, Scan, SearchRequest, SourceFilter,
    StoreError, UpdateOp,
};

use crate::scorer::SentimentScorer;
use crate::types::{ChunkReport, EnrichOptions, PassKind, PassState, PassSummary, RunSummary};
use crate::vocabulary::Vocabulary;
use crate::weapons;

/// Records with text that have not been scored yet.
#[must_use]
pub fn sentiment_selection_query() -> Query {
    BoolQuery::new()
        .must(Query::exists(fields::TEXT))
        .must_not(Query::exists(fields::SENTIMENT_LABEL))
        .into()
}

fn weapons_update(id: String, terms: BTreeSet<String>) -> UpdateOp {
    let mut doc = Map::new();
    doc.insert(
        fields::WEAPONS_FOUND.to_string(),
        Value::Array(terms.into_iter().map(Value::String).collect()),
    );
    UpdateOp::new(id, doc)
}

fn sentiment_update(id: String, scorer: &SentimentScorer, text: &str) -> UpdateOp {
    let (compound, label) = scorer.assess(Some(text));
    let mut doc = Map::new();
    doc.insert(fields::SENTIMENT_SCORE.to_string(), json!(compound));
    doc.insert(fields::SENTIMENT_LABEL.to_string(), json!(label.as_str()));
    UpdateOp::new(id, doc)
}

/// Runs the weapon and sentiment passes against one store.
pub struct Enricher<'a, S: DocumentStore> {
    store: &'a S,
    vocabulary: &'a Vocabulary,
    scorer: &'a SentimentScorer,
    options: EnrichOptions,
}

impl<'a, S: DocumentStore> Enricher<'a, S> {
    pub fn new(
        store: &'a S,
        vocabulary: &'a Vocabulary,
        scorer: &'a SentimentScorer,
        options: EnrichOptions,
    ) -> Self {
        Self {
            store,
            vocabulary,
            scorer,
            options,
        }
    }

    /// Tag every record whose text mentions a vocabulary term with the
    /// canonical terms found.
    ///
    /// Every matching record is rewritten on each run; the write is a
    /// field-level merge, so repeating it is harmless. An empty vocabulary
    /// makes this a no-op that never contacts the store.
    pub async fn enrich_weapons(&self) -> PassSummary {
        let mut summary = PassSummary::new(PassKind::Weapons);
        let Some(request) = weapons::selection_request(self.vocabulary) else {
            tracing::info!(pass = %summary.pass, "vocabulary is empty; nothing to match");
            summary.state = PassState::Done;
            return summary;
        };

        let vocabulary = self.vocabulary;
        self.run_pass(summary, request, PassState::Extracting, |hit| {
            let terms = weapons::extract_from_hit(&hit, vocabulary);
            if terms.is_empty() {
                tracing::debug!(id = %hit.id, "no canonical weapon terms in highlights");
                return None;
            }
            Some(weapons_update(hit.id, terms))
        })
        .await
    }

    /// Score and label every record that has text but no label yet.
    pub async fn enrich_sentiment(&self) -> PassSummary {
        let summary = PassSummary::new(PassKind::Sentiment);
        let request = SearchRequest::new(sentiment_selection_query())
            .source(SourceFilter::Fields(vec![fields::TEXT.to_string()]));

        let scorer = self.scorer;
        self.run_pass(summary, request, PassState::Scoring, |hit| {
            match hit.source_str(fields::TEXT).map(str::trim) {
                Some(text) if !text.is_empty() => Some(sentiment_update(hit.id.clone(), scorer, text)),
                _ => {
                    tracing::debug!(id = %hit.id, "skipping record with empty text");
                    None
                }
            }
        })
        .await
    }

    /// Weapon pass, then sentiment pass. A failure in one does not stop the other.
    pub async fn run_all(&self) -> RunSummary {
        let weapons = self.enrich_weapons().await;
        let sentiment = self.enrich_sentiment().await;
        RunSummary { weapons, sentiment }
    }

    async fn run_pass<F>(
        &self,
        mut summary: PassSummary,
        request: SearchRequest,
        working: PassState,
        mut derive: F,
    ) -> PassSummary
    where
        F: FnMut(Hit) -> Option<UpdateOp>,
    {
        tracing::info!(pass = %summary.pass, "starting enrichment pass");
        let mut scan: Scan<'_, S> = self.store.scan(request, self.options.batch_size);
        let mut writer = ChunkWriter::new(self.store, self.options.chunk_size);

        loop {
            summary.state = PassState::Selecting;
            let batch = match scan.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(e) => return self.abort(summary, &mut writer, &e).await,
            };

            summary.state = working;
            for hit in batch {
                summary.selected += 1;
                match derive(hit) {
                    Some(op) => writer.push(op, &mut summary).await,
                    None => summary.skipped += 1,
                }
            }
        }

        writer.flush(&mut summary).await;
        self.refresh(&mut summary).await;
        summary.state = PassState::Done;

        tracing::info!(
            pass = %summary.pass,
            selected = summary.selected,
            skipped = summary.skipped,
            updated = summary.updated,
            failed = summary.failed,
            chunks = summary.chunks.len(),
            "enrichment pass complete"
        );
        summary
    }

    /// Make written updates visible to search. Failure is logged, not raised.
    async fn refresh(&self, summary: &mut PassSummary) {
        match self.store.refresh().await {
            Ok(()) => {
                summary.state = PassState::Refreshed;
                summary.refreshed = true;
            }
            Err(e) => tracing::warn!(pass = %summary.pass, error = %e, "refresh failed"),
        }
    }

    /// End the pass after a selection failure. Buffered updates are dropped;
    /// chunks already written are still refreshed.
    async fn abort(
        &self,
        mut summary: PassSummary,
        writer: &mut ChunkWriter<'_, S>,
        error: &StoreError,
    ) -> PassSummary {
        let discarded = writer.discard();
        tracing::error!(
            pass = %summary.pass,
            error = %error,
            discarded,
            written_chunks = summary.chunks.len(),
            "selection failed; aborting pass"
        );
        if !summary.chunks.is_empty() {
            self.refresh(&mut summary).await;
        }
        summary.state = PassState::Aborted;
        summary.aborted = Some(error.to_string());
        summary
    }
}

/// Buffers update operations and submits them `chunk_size` at a time.
struct ChunkWriter<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    chunk_size: usize,
    pending: Vec<UpdateOp>,
}

impl<'a, S: DocumentStore + ?Sized> ChunkWriter<'a, S> {
    fn new(store: &'a S, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            store,
            chunk_size,
            pending: Vec::with_capacity(chunk_size),
        }
    }

    async fn push(&mut self, op: UpdateOp, summary: &mut PassSummary) {
        self.pending.push(op);
        if self.pending.len() >= self.chunk_size {
            self.flush(summary).await;
        }
    }

    /// Submit whatever is buffered as one chunk. Failures are recorded, never raised.
    async fn flush(&mut self, summary: &mut PassSummary) {
        if self.pending.is_empty() {
            return;
        }
        let ops = std::mem::take(&mut self.pending);
        let previous = summary.state;
        summary.state = PassState::BulkWriting;
        let index = summary.chunks.len();

        let report = match self.store.bulk(&ops).await {
            Ok(outcome) => ChunkReport {
                index,
                submitted: ops.len(),
                success: outcome.success,
                failures: outcome.failed,
            },
            Err(e) => {
                let status = e.status().unwrap_or(0);
                let reason = e.to_string();
                ChunkReport {
                    index,
                    submitted: ops.len(),
                    success: 0,
                    failures: ops
                        .iter()
                        .map(|op| BulkFailure {
                            id: Some(op.id.clone()),
                            status,
                            reason: reason.clone(),
                        })
                        .collect(),
                }
            }
        };

        if report.failures.is_empty() {
            tracing::debug!(pass = %summary.pass, chunk = index, success = report.success, "chunk written");
        } else {
            for failure in &report.failures {
                tracing::debug!(
                    pass = %summary.pass,
                    chunk = index,
                    id = failure.id.as_deref().unwrap_or("-"),
                    status = failure.status,
                    reason = %failure.reason,
                    "update rejected"
                );
            }
            tracing::warn!(
                pass = %summary.pass,
                chunk = index,
                success = report.success,
                failed = report.failures.len(),
                "chunk had failed updates"
            );
        }

        summary.record_chunk(report);
        summary.state = previous;
    }

    /// Drop buffered operations without sending them, returning how many there were.
    fn discard(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }
}
