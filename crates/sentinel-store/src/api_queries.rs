//! Read-side queries over enriched records.

use serde_json::{Map, Value};

use sentinel_core::fields;

use crate::error::StoreError;
use crate::query::{BoolQuery, Query, SearchRequest};
use crate::store::DocumentStore;

/// Antisemitic records that mention at least one weapon.
#[must_use]
pub fn antisemitic_with_weapon_query() -> Query {
    BoolQuery::new()
        .must(Query::term(fields::ANTISEMITIC_FLAG, 1))
        .must(Query::exists(fields::WEAPONS_FOUND))
        .into()
}

/// Records whose `weapons_found` holds two or more distinct terms.
///
/// Reads doc values, so `weapons_found` must be mapped as `keyword`.
#[must_use]
pub fn two_or_more_weapons_query() -> Query {
    BoolQuery::new()
        .must(Query::script(format!(
            "doc['{}'].size() >= 2",
            fields::WEAPONS_FOUND
        )))
        .into()
}

/// Fetch the `_source` of up to `limit` antisemitic records with weapons.
///
/// # Errors
///
/// Returns [`StoreError`] if the search fails.
pub async fn list_antisemitic_with_weapon(
    store: &dyn DocumentStore,
    limit: usize,
) -> Result<Vec<Map<String, Value>>, StoreError> {
    fetch_sources(store, antisemitic_with_weapon_query(), limit).await
}

/// Fetch the `_source` of up to `limit` records with two or more weapons.
///
/// # Errors
///
/// Returns [`StoreError`] if the search fails.
pub async fn list_two_or_more_weapons(
    store: &dyn DocumentStore,
    limit: usize,
) -> Result<Vec<Map<String, Value>>, StoreError> {
    fetch_sources(store, two_or_more_weapons_query(), limit).await
}

async fn fetch_sources(
    store: &dyn DocumentStore,
    query: Query,
    limit: usize,
) -> Result<Vec<Map<String, Value>>, StoreError> {
    let hits = store.search(&SearchRequest::new(query).size(limit)).await?;
    Ok(hits.into_iter().filter_map(|hit| hit.source).collect())
}
