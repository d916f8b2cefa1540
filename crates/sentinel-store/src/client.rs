//! HTTP client for an Elasticsearch-compatible REST endpoint.
//!
//! Wraps `reqwest` with index scoping, optional basic auth, retry on
//! transient failures, and typed decoding of the handful of endpoints the
//! engine uses (`_search`, scroll, `_bulk`, `_delete_by_query`, `_refresh`,
//! `_count`, `_doc`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use sentinel_core::{fields, AppConfig};

use crate::bulk::{encode_inserts, encode_updates, parse_bulk_response};
use crate::error::StoreError;
use crate::query::{Query, SearchRequest};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::store::DocumentStore;
use crate::types::{
    BulkOutcome, CountResponse, DeleteByQueryResponse, Hit, IndexResponse, ScrollPage,
    SearchResponse, UpdateOp,
};

/// Longest error body kept in [`StoreError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// Connection and retry settings for [`EsClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub request_timeout_secs: u64,
    pub bulk_timeout_secs: u64,
    pub scroll_keepalive: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            bulk_timeout_secs: 60,
            scroll_keepalive: "2m".to_string(),
            max_retries: 3,
            retry_backoff_ms: 500,
            username: None,
            password: None,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout_secs: config.es_request_timeout_secs,
            bulk_timeout_secs: config.bulk_timeout_secs,
            scroll_keepalive: config.scroll_keepalive.clone(),
            max_retries: config.es_max_retries,
            retry_backoff_ms: config.es_retry_backoff_ms,
            username: config.es_username.clone(),
            password: config.es_password.clone(),
        }
    }
}

enum Body<'a> {
    Empty,
    Json(&'a Value),
    NdJson(&'a str),
}

/// Store client bound to a single index.
#[derive(Clone)]
pub struct EsClient {
    client: Client,
    base_url: Url,
    index: String,
    options: ClientOptions,
}

impl std::fmt::Debug for EsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsClient")
            .field("base_url", &self.base_url.as_str())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl EsClient {
    /// Creates a client for `index` on the store at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] if `base_url` does not parse, or
    /// [`StoreError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(base_url: &str, index: &str, options: ClientOptions) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sentinel/0.1 (corpus-enrichment)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| StoreError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            index: index.to_owned(),
            options,
        })
    }

    /// Builds a client from application config.
    ///
    /// # Errors
    ///
    /// See [`EsClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, StoreError> {
        Self::new(
            &config.es_url,
            &config.index,
            ClientOptions::from_app_config(config),
        )
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Index mapping for the record fields the engine reads and writes.
    #[must_use]
    pub fn record_mapping() -> Value {
        json!({
            "mappings": {
                "properties": {
                    (fields::TEXT): { "type": "text" },
                    (fields::ANTISEMITIC_FLAG): { "type": "integer" },
                    (fields::WEAPONS_FOUND): { "type": "keyword" },
                    (fields::SENTIMENT_SCORE): { "type": "float" },
                    (fields::SENTIMENT_LABEL): { "type": "keyword" }
                }
            }
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, StoreError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| StoreError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn index_path(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.index)
    }

    /// Sends one request and returns the raw response, without status checks.
    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        body: &Body<'_>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, StoreError> {
        let mut request = self.client.request(method, url.clone());
        if let (Some(user), Some(pass)) = (&self.options.username, &self.options.password) {
            request = request.basic_auth(user, Some(pass));
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(value),
            Body::NdJson(text) => request
                .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                .body((*text).to_owned()),
        };
        Ok(request.send().await?)
    }

    /// Sends a request with retry, asserts a 2xx status, and decodes the body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Body<'_>,
        timeout: Option<Duration>,
        policy: RetryPolicy,
        context: &str,
    ) -> Result<T, StoreError> {
        let url = &url;
        let body = &body;
        let text = retry_with_backoff(
            policy,
            self.options.max_retries,
            self.options.retry_backoff_ms,
            move || {
                let method = method.clone();
                async move {
                    let response = self.send_once(method, url, body, timeout).await?;
                    let status = response.status();
                    let text = response.text().await?;
                    if !status.is_success() {
                        return Err(api_error(status, &text));
                    }
                    Ok(text)
                }
            },
        )
        .await?;

        serde_json::from_str(&text).map_err(|e| StoreError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn scroll_page(response: SearchResponse) -> ScrollPage {
        ScrollPage {
            scroll_id: response.scroll_id,
            hits: response.hits.hits,
        }
    }
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    let mut body = body.trim().to_string();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    StoreError::Api {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl DocumentStore for EsClient {
    async fn ensure_index(&self) -> Result<bool, StoreError> {
        let url = self.url(&self.index, &[])?;
        let response = self.send_once(Method::HEAD, &url, &Body::Empty, None).await?;
        match response.status() {
            s if s.is_success() => return Ok(false),
            StatusCode::NOT_FOUND => {}
            s => return Err(api_error(s, "")),
        }

        let mapping = Self::record_mapping();
        let response = self
            .send_once(Method::PUT, &url, &Body::Json(&mapping), None)
            .await?;
        let status = response.status();
        if status.is_success() {
            tracing::info!(index = %self.index, "created index");
            return Ok(true);
        }
        let text = response.text().await?;
        // Lost a creation race with another process.
        if status == StatusCode::BAD_REQUEST && text.contains("resource_already_exists_exception") {
            return Ok(false);
        }
        Err(api_error(status, &text))
    }

    async fn insert(&self, doc: &Value) -> Result<String, StoreError> {
        let url = self.url(&self.index_path("_doc"), &[])?;
        let response: IndexResponse = self
            .request_json(Method::POST, url, Body::Json(doc), None, RetryPolicy::Unsent, "insert")
            .await?;
        Ok(response.id)
    }

    async fn insert_many(&self, docs: &[Value]) -> Result<BulkOutcome, StoreError> {
        if docs.is_empty() {
            return Ok(BulkOutcome::default());
        }
        let body = encode_inserts(&self.index, docs)?;
        let url = self.url("_bulk", &[])?;
        let response: Value = self
            .request_json(
                Method::POST,
                url,
                Body::NdJson(&body),
                Some(Duration::from_secs(self.options.bulk_timeout_secs)),
                RetryPolicy::Unsent,
                "bulk insert",
            )
            .await?;
        parse_bulk_response(&response)
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Hit>, StoreError> {
        let url = self.url(&self.index_path("_search"), &[])?;
        let body = request.to_body();
        let response: SearchResponse = self
            .request_json(
                Method::POST,
                url,
                Body::Json(&body),
                None,
                RetryPolicy::Transient,
                "search",
            )
            .await?;
        Ok(response.hits.hits)
    }

    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        let url = self.url(&self.index_path("_count"), &[])?;
        let body = json!({ "query": query.to_value() });
        let response: CountResponse = self
            .request_json(
                Method::POST,
                url,
                Body::Json(&body),
                None,
                RetryPolicy::Transient,
                "count",
            )
            .await?;
        Ok(response.count)
    }

    async fn open_scroll(
        &self,
        request: &SearchRequest,
        batch_size: usize,
    ) -> Result<ScrollPage, StoreError> {
        let url = self.url(
            &self.index_path("_search"),
            &[("scroll", &self.options.scroll_keepalive)],
        )?;
        let body = request.clone().size(batch_size).to_body();
        let response: SearchResponse = self
            .request_json(
                Method::POST,
                url,
                Body::Json(&body),
                None,
                RetryPolicy::Unsent,
                "open scroll",
            )
            .await?;
        Ok(Self::scroll_page(response))
    }

    async fn continue_scroll(&self, scroll_id: &str) -> Result<ScrollPage, StoreError> {
        let url = self.url("_search/scroll", &[])?;
        let body = json!({ "scroll": self.options.scroll_keepalive, "scroll_id": scroll_id });
        let response: SearchResponse = self
            .request_json(
                Method::POST,
                url,
                Body::Json(&body),
                None,
                RetryPolicy::Unsent,
                "continue scroll",
            )
            .await?;
        Ok(Self::scroll_page(response))
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<(), StoreError> {
        let url = self.url("_search/scroll", &[])?;
        let body = json!({ "scroll_id": [scroll_id] });
        let response = self
            .send_once(Method::DELETE, &url, &Body::Json(&body), None)
            .await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let text = response.text().await?;
        Err(api_error(status, &text))
    }

    async fn bulk(&self, ops: &[UpdateOp]) -> Result<BulkOutcome, StoreError> {
        if ops.is_empty() {
            return Ok(BulkOutcome::default());
        }
        let body = encode_updates(&self.index, ops)?;
        let url = self.url("_bulk", &[])?;
        let response: Value = self
            .request_json(
                Method::POST,
                url,
                Body::NdJson(&body),
                Some(Duration::from_secs(self.options.bulk_timeout_secs)),
                RetryPolicy::Transient,
                "bulk update",
            )
            .await?;
        parse_bulk_response(&response)
    }

    async fn delete_by_query(&self, query: &Query) -> Result<u64, StoreError> {
        let url = self.url(
            &self.index_path("_delete_by_query"),
            &[("refresh", "true"), ("conflicts", "proceed")],
        )?;
        let body = json!({ "query": query.to_value() });
        let response: DeleteByQueryResponse = self
            .request_json(
                Method::POST,
                url,
                Body::Json(&body),
                Some(Duration::from_secs(self.options.bulk_timeout_secs)),
                RetryPolicy::Unsent,
                "delete by query",
            )
            .await?;
        Ok(response.deleted)
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        let url = self.url(&self.index_path("_refresh"), &[])?;
        let _: Value = self
            .request_json(Method::POST, url, Body::Empty, None, RetryPolicy::Transient, "refresh")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
