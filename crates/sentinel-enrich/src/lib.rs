//! Enrichment and retention engine.
//!
//! Derives `weapons_found` from store-side phrase highlighting against a
//! canonical vocabulary, derives `sentiment_score`/`sentiment_label` from a
//! VADER-style lexicon model, writes both back as chunked partial updates, and
//! deletes records the retention rule marks as irrelevant.

pub mod error;
pub mod pipeline;
pub mod retention;
pub mod scorer;
pub mod types;
pub mod vocabulary;
pub mod weapons;

mod lexicon;

pub use error::EnrichError;
pub use pipeline::{sentiment_selection_query, Enricher};
pub use retention::{retention_predicate, RetentionFilter, RetentionPreview, RetentionSample};
pub use scorer::SentimentScorer;
pub use types::{ChunkReport, EnrichOptions, PassKind, PassState, PassSummary, RunSummary};
pub use vocabulary::{Vocabulary, VocabularyLoad, VocabularyWarning};
