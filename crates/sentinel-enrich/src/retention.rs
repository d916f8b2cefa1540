//! Retention rule: delete records that carry no monitoring signal.

use sentinel_core::{fields, SentimentLabel};
use sentinel_store::{BoolQuery, DocumentStore, Query, SearchRequest, SourceFilter};

use crate::error::EnrichError;

/// Records that are not flagged, are not negative, and mention no weapon.
///
/// `exists` is false for an empty array, so records whose `weapons_found`
/// is empty are matched as well.
#[must_use]
pub fn retention_predicate() -> Query {
    let non_negative = BoolQuery::new()
        .should(Query::term(
            fields::SENTIMENT_LABEL,
            SentimentLabel::Positive.as_str(),
        ))
        .should(Query::term(
            fields::SENTIMENT_LABEL,
            SentimentLabel::Neutral.as_str(),
        ))
        .minimum_should_match(1);

    BoolQuery::new()
        .must(Query::term(fields::ANTISEMITIC_FLAG, 0))
        .must(non_negative.into())
        .must_not(Query::exists(fields::WEAPONS_FOUND))
        .into()
}

/// One record that [`RetentionFilter::apply`] would delete.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionSample {
    pub id: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetentionPreview {
    /// Total records matching the predicate.
    pub count: u64,
    pub sample: Vec<RetentionSample>,
}

pub struct RetentionFilter<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> RetentionFilter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Count matching records and fetch up to `sample_size` of them. Read-only.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Store`] if the count or sample search fails.
    pub async fn preview(&self, sample_size: usize) -> Result<RetentionPreview, EnrichError> {
        let predicate = retention_predicate();
        let count = self.store.count(&predicate).await?;
        let sample = if sample_size == 0 {
            Vec::new()
        } else {
            let request = SearchRequest::new(predicate)
                .source(SourceFilter::Fields(vec![fields::TEXT.to_string()]))
                .size(sample_size);
            self.store
                .search(&request)
                .await?
                .into_iter()
                .map(|hit| RetentionSample {
                    text: hit.source_str(fields::TEXT).map(str::to_string),
                    id: hit.id,
                })
                .collect()
        };
        Ok(RetentionPreview { count, sample })
    }

    /// Delete every matching record. Irreversible.
    ///
    /// Returns the number deleted, or `0` if the store call fails.
    pub async fn apply(&self) -> u64 {
        let predicate = retention_predicate();
        tracing::debug!(predicate = %predicate.to_value(), "applying retention rule");
        match self.store.delete_by_query(&predicate).await {
            Ok(deleted) => {
                tracing::info!(deleted, "retention rule applied");
                deleted
            }
            Err(e) => {
                tracing::error!(error = %e, "retention delete failed; no records removed");
                0
            }
        }
    }
}
