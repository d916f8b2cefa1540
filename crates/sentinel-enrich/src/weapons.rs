//! Weapon-term extraction through store-side phrase matching and highlighting.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use sentinel_core::fields;
use sentinel_store::{BoolQuery, Highlight, Hit, Query, SearchRequest, SourceFilter};

use crate::vocabulary::Vocabulary;

pub const PRE_TAG: &str = "<weapon>";
pub const POST_TAG: &str = "</weapon>";

static TAGGED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<weapon>(.*?)</weapon>").expect("valid regex"));

/// Records whose text contains any vocabulary term as a phrase.
///
/// `None` for an empty vocabulary: there is nothing to select.
#[must_use]
pub fn selection_query(vocabulary: &Vocabulary) -> Option<Query> {
    if vocabulary.is_empty() {
        return None;
    }
    let query = vocabulary
        .terms()
        .iter()
        .fold(BoolQuery::new(), |q, term| {
            q.should(Query::match_phrase(fields::TEXT, term.as_str()))
        })
        .minimum_should_match(1);
    Some(query.into())
}

/// Full selection request: phrase query, whole-field highlight, no `_source`.
#[must_use]
pub fn selection_request(vocabulary: &Vocabulary) -> Option<SearchRequest> {
    selection_query(vocabulary).map(|query| {
        SearchRequest::new(query)
            .source(SourceFilter::Disabled)
            .highlight(Highlight::full_field(fields::TEXT, PRE_TAG, POST_TAG))
    })
}

/// Canonical vocabulary terms enclosed in highlight tags within `fragments`.
#[must_use]
pub fn extract_terms<S: AsRef<str>>(fragments: &[S], vocabulary: &Vocabulary) -> BTreeSet<String> {
    fragments
        .iter()
        .flat_map(|fragment| TAGGED_SPAN.captures_iter(fragment.as_ref()))
        .filter_map(|caps| caps.get(1))
        .filter_map(|span| vocabulary.canonical(span.as_str()))
        .map(str::to_string)
        .collect()
}

/// Canonical terms highlighted in the `text` field of `hit`.
#[must_use]
pub fn extract_from_hit(hit: &Hit, vocabulary: &Vocabulary) -> BTreeSet<String> {
    extract_terms(hit.highlights(fields::TEXT), vocabulary)
}
