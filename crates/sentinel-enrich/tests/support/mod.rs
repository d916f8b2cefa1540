//! In-memory `DocumentStore` used by the enrichment integration tests.
//!
//! Evaluates the typed query DSL directly: `match_phrase` is a
//! case-insensitive contiguous token match, `term` compares JSON values
//! (any element for arrays), `exists` ignores nulls and empty arrays, and
//! scripts of the form `doc['f'].size() >= N` count array elements.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use sentinel_store::{
    BulkFailure, BulkOutcome, DocumentStore, Highlight, Hit, Query, ScrollPage, SearchRequest,
    SourceFilter, StoreError, UpdateOp,
};

struct ScrollCursor {
    remaining: Vec<Hit>,
    page_size: usize,
}

#[derive(Default)]
struct State {
    docs: BTreeMap<String, Map<String, Value>>,
    next_id: u64,
    scrolls: HashMap<String, ScrollCursor>,
    next_scroll: u64,
    calls: Vec<&'static str>,
    bulk_sizes: Vec<usize>,
    reject_ids: HashSet<String>,
    fail_bulk_calls: HashSet<usize>,
    fail_open_scroll: bool,
    fail_continue_scroll: bool,
    fail_refresh: bool,
    fail_delete: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn unavailable() -> StoreError {
    StoreError::Api {
        status: 503,
        body: "unavailable".to_string(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with documents under ids `doc-0`, `doc-1`, ...
    pub fn with_docs(docs: Vec<Value>) -> Self {
        let store = Self::new();
        for doc in docs {
            store.put(doc);
        }
        store
    }

    pub fn put(&self, doc: Value) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("doc-{}", state.next_id);
        state.next_id += 1;
        let Value::Object(map) = doc else {
            panic!("documents must be JSON objects");
        };
        state.docs.insert(id.clone(), map);
        id
    }

    pub fn get(&self, id: &str) -> Option<Map<String, Value>> {
        self.state.lock().unwrap().docs.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().docs.len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of operations in each `bulk` request, in order.
    pub fn bulk_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().bulk_sizes.clone()
    }

    pub fn open_scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls.len()
    }

    /// Reject updates for `id` with a 409 item failure.
    pub fn reject_updates_for(&self, id: &str) {
        self.state.lock().unwrap().reject_ids.insert(id.to_string());
    }

    /// Fail the `n`-th (zero-based) `bulk` request as a whole.
    pub fn fail_bulk_call(&self, n: usize) {
        self.state.lock().unwrap().fail_bulk_calls.insert(n);
    }

    pub fn fail_open_scroll(&self) {
        self.state.lock().unwrap().fail_open_scroll = true;
    }

    pub fn fail_continue_scroll(&self) {
        self.state.lock().unwrap().fail_continue_scroll = true;
    }

    pub fn fail_refresh(&self) {
        self.state.lock().unwrap().fail_refresh = true;
    }

    pub fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    fn matching_hits(state: &State, request: &SearchRequest) -> Vec<Hit> {
        state
            .docs
            .iter()
            .filter(|(_, doc)| matches(&request.query, doc))
            .map(|(id, doc)| to_hit(id, doc, request))
            .collect()
    }
}

fn to_hit(id: &str, doc: &Map<String, Value>, request: &SearchRequest) -> Hit {
    let source = match &request.source {
        SourceFilter::All => Some(doc.clone()),
        SourceFilter::Disabled => None,
        SourceFilter::Fields(fields) => Some(
            doc.iter()
                .filter(|(k, _)| fields.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
    };
    let mut highlight = HashMap::new();
    if let Some(h) = &request.highlight {
        if let Some(fragment) = highlight_field(h, &request.query, doc) {
            highlight.insert(h.field.clone(), vec![fragment]);
        }
    }
    Hit {
        id: id.to_string(),
        source,
        highlight,
    }
}

/// Word tokens of `text` as byte ranges.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            spans.push((s, i));
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

fn words(text: &str) -> Vec<String> {
    word_spans(text)
        .into_iter()
        .map(|(s, e)| text[s..e].to_lowercase())
        .collect()
}

/// Start positions (in tokens) where `phrase` occurs contiguously in `text`.
fn phrase_positions(text: &str, phrase: &str) -> Vec<usize> {
    let haystack = words(text);
    let needle = words(phrase);
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| haystack[i..i + needle.len()] == needle[..])
        .collect()
}

fn collect_phrases<'q>(query: &'q Query, field: &str, out: &mut Vec<&'q str>) {
    match query {
        Query::MatchPhrase { field: f, phrase } if f == field => out.push(phrase),
        Query::Bool(b) => {
            for q in b.must.iter().chain(&b.should) {
                collect_phrases(q, field, out);
            }
        }
        _ => {}
    }
}

/// Whole-field highlight wrapping every matched phrase occurrence.
fn highlight_field(h: &Highlight, query: &Query, doc: &Map<String, Value>) -> Option<String> {
    let text = doc.get(&h.field)?.as_str()?;
    let mut phrases = Vec::new();
    collect_phrases(query, &h.field, &mut phrases);

    let spans = word_spans(text);
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for phrase in phrases {
        let len = words(phrase).len();
        for start in phrase_positions(text, phrase) {
            ranges.push((spans[start].0, spans[start + len - 1].1));
        }
    }
    if ranges.is_empty() {
        return None;
    }
    ranges.sort_unstable();
    ranges.dedup();

    let mut out = String::new();
    let mut cursor = 0;
    for (s, e) in ranges {
        if s < cursor {
            continue;
        }
        out.push_str(&text[cursor..s]);
        out.push_str(&h.pre_tag);
        out.push_str(&text[s..e]);
        out.push_str(&h.post_tag);
        cursor = e;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

fn present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn matches(query: &Query, doc: &Map<String, Value>) -> bool {
    match query {
        Query::MatchAll => true,
        Query::MatchPhrase { field, phrase } => doc
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|text| !phrase_positions(text, phrase).is_empty()),
        Query::Term { field, value } => match doc.get(field) {
            Some(Value::Array(items)) => items.contains(value),
            Some(v) => v == value,
            None => false,
        },
        Query::Exists { field } => present(doc.get(field)),
        Query::Script { source } => script_matches(source, doc),
        Query::Bool(b) => {
            let must = b.must.iter().all(|q| matches(q, doc));
            let must_not = b.must_not.iter().any(|q| matches(q, doc));
            let default_msm = u32::from(b.must.is_empty() && !b.should.is_empty());
            let required = b.minimum_should_match.unwrap_or(default_msm) as usize;
            let should = b.should.iter().filter(|q| matches(q, doc)).count() >= required;
            must && !must_not && should
        }
    }
}

/// Supports `doc['field'].size() >= N` only.
fn script_matches(source: &str, doc: &Map<String, Value>) -> bool {
    let parsed = source
        .strip_prefix("doc['")
        .and_then(|rest| rest.split_once("'].size() >= "));
    let Some((field, n)) = parsed else {
        panic!("unsupported script: {source}");
    };
    let n: usize = n.trim().parse().expect("numeric size bound");
    let size = match doc.get(field) {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Null) | None => 0,
        Some(_) => 1,
    };
    size >= n
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_index(&self) -> Result<bool, StoreError> {
        self.state.lock().unwrap().calls.push("ensure_index");
        Ok(false)
    }

    async fn insert(&self, doc: &Value) -> Result<String, StoreError> {
        self.state.lock().unwrap().calls.push("insert");
        Ok(self.put(doc.clone()))
    }

    async fn insert_many(&self, docs: &[Value]) -> Result<BulkOutcome, StoreError> {
        self.state.lock().unwrap().calls.push("insert_many");
        for doc in docs {
            self.put(doc.clone());
        }
        Ok(BulkOutcome {
            success: docs.len(),
            failed: Vec::new(),
        })
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Hit>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("search");
        let mut hits = Self::matching_hits(&state, request);
        hits.truncate(request.size.unwrap_or(10));
        Ok(hits)
    }

    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("count");
        Ok(state.docs.values().filter(|d| matches(query, d)).count() as u64)
    }

    async fn open_scroll(
        &self,
        request: &SearchRequest,
        batch_size: usize,
    ) -> Result<ScrollPage, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("open_scroll");
        if state.fail_open_scroll {
            return Err(unavailable());
        }
        let mut hits = Self::matching_hits(&state, request);
        let rest = hits.split_off(batch_size.min(hits.len()));
        let id = format!("scroll-{}", state.next_scroll);
        state.next_scroll += 1;
        state.scrolls.insert(
            id.clone(),
            ScrollCursor {
                remaining: rest,
                page_size: batch_size,
            },
        );
        Ok(ScrollPage {
            scroll_id: Some(id),
            hits,
        })
    }

    async fn continue_scroll(&self, scroll_id: &str) -> Result<ScrollPage, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("continue_scroll");
        if state.fail_continue_scroll {
            return Err(unavailable());
        }
        let cursor = state
            .scrolls
            .get_mut(scroll_id)
            .ok_or_else(|| StoreError::Api {
                status: 404,
                body: "search_context_missing_exception".to_string(),
            })?;
        let rest = cursor
            .remaining
            .split_off(cursor.page_size.min(cursor.remaining.len()));
        let page = std::mem::replace(&mut cursor.remaining, rest);
        Ok(ScrollPage {
            scroll_id: Some(scroll_id.to_string()),
            hits: page,
        })
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("clear_scroll");
        state.scrolls.remove(scroll_id);
        Ok(())
    }

    async fn bulk(&self, ops: &[UpdateOp]) -> Result<BulkOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("bulk");
        let call = state.bulk_sizes.len();
        state.bulk_sizes.push(ops.len());
        if state.fail_bulk_calls.contains(&call) {
            return Err(unavailable());
        }

        let mut outcome = BulkOutcome::default();
        for op in ops {
            if state.reject_ids.contains(&op.id) {
                outcome.failed.push(BulkFailure {
                    id: Some(op.id.clone()),
                    status: 409,
                    reason: "version_conflict_engine_exception: conflict".to_string(),
                });
                continue;
            }
            match state.docs.get_mut(&op.id) {
                Some(doc) => {
                    for (k, v) in &op.doc {
                        doc.insert(k.clone(), v.clone());
                    }
                    outcome.success += 1;
                }
                None => outcome.failed.push(BulkFailure {
                    id: Some(op.id.clone()),
                    status: 404,
                    reason: "document_missing_exception: missing".to_string(),
                }),
            }
        }
        Ok(outcome)
    }

    async fn delete_by_query(&self, query: &Query) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("delete_by_query");
        if state.fail_delete {
            return Err(unavailable());
        }
        let before = state.docs.len();
        state.docs.retain(|_, doc| !matches(query, doc));
        Ok((before - state.docs.len()) as u64)
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("refresh");
        if state.fail_refresh {
            return Err(unavailable());
        }
        Ok(())
    }
}
