//! Typed query DSL for the subset of Elasticsearch queries Sentinel issues.
//!
//! Queries are built as values and rendered with [`Query::to_value`] only at
//! the HTTP boundary, so callers and test doubles can inspect them without
//! re-parsing JSON.

use serde_json::{json, Map, Value};

/// A leaf or compound query.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    /// Contiguous, analyzed phrase match on one field.
    MatchPhrase { field: String, phrase: String },
    /// Exact, non-analyzed value match.
    Term { field: String, value: Value },
    /// Field is present with at least one non-null value.
    Exists { field: String },
    /// Painless script predicate over doc values.
    Script { source: String },
    Bool(BoolQuery),
}

/// Boolean combination of clauses. Empty clause lists are omitted when rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub minimum_should_match: Option<u32>,
}

impl Query {
    #[must_use]
    pub fn match_phrase(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self::MatchPhrase {
            field: field.into(),
            phrase: phrase.into(),
        }
    }

    #[must_use]
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn script(source: impl Into<String>) -> Self {
        Self::Script {
            source: source.into(),
        }
    }

    /// Render the query in Elasticsearch JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::MatchAll => json!({ "match_all": {} }),
            Self::MatchPhrase { field, phrase } => json!({ "match_phrase": { field: phrase } }),
            Self::Term { field, value } => json!({ "term": { field: value } }),
            Self::Exists { field } => json!({ "exists": { "field": field } }),
            Self::Script { source } => json!({
                "script": { "script": { "source": source, "lang": "painless" } }
            }),
            Self::Bool(b) => b.to_value(),
        }
    }
}

impl BoolQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn must(mut self, clause: Query) -> Self {
        self.must.push(clause);
        self
    }

    #[must_use]
    pub fn should(mut self, clause: Query) -> Self {
        self.should.push(clause);
        self
    }

    #[must_use]
    pub fn must_not(mut self, clause: Query) -> Self {
        self.must_not.push(clause);
        self
    }

    #[must_use]
    pub fn minimum_should_match(mut self, n: u32) -> Self {
        self.minimum_should_match = Some(n);
        self
    }

    fn to_value(&self) -> Value {
        let render = |clauses: &[Query]| Value::Array(clauses.iter().map(Query::to_value).collect());

        let mut body = Map::new();
        if !self.must.is_empty() {
            body.insert("must".to_string(), render(&self.must));
        }
        if !self.should.is_empty() {
            body.insert("should".to_string(), render(&self.should));
        }
        if !self.must_not.is_empty() {
            body.insert("must_not".to_string(), render(&self.must_not));
        }
        if let Some(n) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(n));
        }
        json!({ "bool": body })
    }
}

impl From<BoolQuery> for Query {
    fn from(value: BoolQuery) -> Self {
        Self::Bool(value)
    }
}

/// Which parts of `_source` a search should return.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SourceFilter {
    #[default]
    All,
    Disabled,
    Fields(Vec<String>),
}

/// Highlight settings for a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub field: String,
    pub pre_tag: String,
    pub post_tag: String,
    pub fragment_size: u32,
    pub number_of_fragments: u32,
    pub no_match_size: u32,
    pub require_field_match: bool,
    pub boundary_scanner: String,
}

impl Highlight {
    /// Highlight the whole field (no fragment truncation) with a custom tag
    /// pair, word-boundary scanning, and only when the field itself matched.
    #[must_use]
    pub fn full_field(
        field: impl Into<String>,
        pre_tag: impl Into<String>,
        post_tag: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            pre_tag: pre_tag.into(),
            post_tag: post_tag.into(),
            fragment_size: 100,
            number_of_fragments: 0,
            no_match_size: 0,
            require_field_match: true,
            boundary_scanner: "word".to_string(),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert(
            self.field.clone(),
            json!({
                "pre_tags": [self.pre_tag],
                "post_tags": [self.post_tag],
                "fragment_size": self.fragment_size,
                "number_of_fragments": self.number_of_fragments,
                "no_match_size": self.no_match_size,
            }),
        );
        json!({
            "fields": fields,
            "require_field_match": self.require_field_match,
            "boundary_scanner": self.boundary_scanner,
        })
    }
}

/// A search body: query plus source filtering, highlighting and page size.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Query,
    pub source: SourceFilter,
    pub highlight: Option<Highlight>,
    pub size: Option<usize>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: Query) -> Self {
        Self {
            query,
            source: SourceFilter::All,
            highlight: None,
            size: None,
        }
    }

    #[must_use]
    pub fn source(mut self, source: SourceFilter) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Render the request body sent to `_search`.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_value());
        match &self.source {
            SourceFilter::All => {}
            SourceFilter::Disabled => {
                body.insert("_source".to_string(), Value::Bool(false));
            }
            SourceFilter::Fields(fields) => {
                body.insert("_source".to_string(), json!(fields));
            }
        }
        if let Some(highlight) = &self.highlight {
            body.insert("highlight".to_string(), highlight.to_value());
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_query_omits_empty_clauses() {
        let q: Query = BoolQuery::new().must(Query::exists("text")).into();
        assert_eq!(
            q.to_value(),
            json!({ "bool": { "must": [{ "exists": { "field": "text" } }] } })
        );
    }

    #[test]
    fn term_query_keeps_value_type() {
        assert_eq!(
            Query::term("antisemitic_flag", 0).to_value(),
            json!({ "term": { "antisemitic_flag": 0 } })
        );
        assert_eq!(
            Query::term("sentiment_label", "neutral").to_value(),
            json!({ "term": { "sentiment_label": "neutral" } })
        );
    }

    #[test]
    fn script_query_uses_painless() {
        assert_eq!(
            Query::script("doc['x'].size() > 0").to_value(),
            json!({ "script": { "script": { "source": "doc['x'].size() > 0", "lang": "painless" } } })
        );
    }

    #[test]
    fn full_field_highlight_renders_expected_shape() {
        let highlight = Highlight::full_field("text", "<weapon>", "</weapon>");
        assert_eq!(
            highlight.to_value(),
            json!({
                "fields": {
                    "text": {
                        "pre_tags": ["<weapon>"],
                        "post_tags": ["</weapon>"],
                        "fragment_size": 100,
                        "number_of_fragments": 0,
                        "no_match_size": 0
                    }
                },
                "require_field_match": true,
                "boundary_scanner": "word"
            })
        );
    }

    #[test]
    fn search_body_includes_source_filter_and_size() {
        let body = SearchRequest::new(Query::MatchAll)
            .source(SourceFilter::Fields(vec!["text".to_string()]))
            .size(25)
            .to_body();
        assert_eq!(
            body,
            json!({ "query": { "match_all": {} }, "_source": ["text"], "size": 25 })
        );
    }

    #[test]
    fn search_body_disables_source() {
        let body = SearchRequest::new(Query::MatchAll)
            .source(SourceFilter::Disabled)
            .to_body();
        assert_eq!(body["_source"], json!(false));
        assert!(body.get("size").is_none());
    }
}
