use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::{Query, SearchRequest};
use crate::scan::Scan;
use crate::types::{BulkOutcome, Hit, ScrollPage, UpdateOp};

/// Primitive operations the enrichment engine and read side need from the
/// document store. Every method targets the store's configured index.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the index with the record mapping if it does not exist.
    /// Returns `true` when the index was created by this call.
    async fn ensure_index(&self) -> Result<bool, StoreError>;

    /// Insert one document, returning its store-assigned id.
    async fn insert(&self, doc: &Value) -> Result<String, StoreError>;

    /// Insert documents in a single bulk request.
    async fn insert_many(&self, docs: &[Value]) -> Result<BulkOutcome, StoreError>;

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Hit>, StoreError>;

    async fn count(&self, query: &Query) -> Result<u64, StoreError>;

    /// Start a scroll cursor returning at most `batch_size` hits per page.
    async fn open_scroll(
        &self,
        request: &SearchRequest,
        batch_size: usize,
    ) -> Result<ScrollPage, StoreError>;

    async fn continue_scroll(&self, scroll_id: &str) -> Result<ScrollPage, StoreError>;

    /// Release server-side cursor state. Already-expired cursors are not an error.
    async fn clear_scroll(&self, scroll_id: &str) -> Result<(), StoreError>;

    /// Submit partial updates in one request. Per-item failures are reported
    /// in the outcome, not as an `Err`.
    async fn bulk(&self, ops: &[UpdateOp]) -> Result<BulkOutcome, StoreError>;

    /// Delete every record matching `query`, returning the number removed.
    async fn delete_by_query(&self, query: &Query) -> Result<u64, StoreError>;

    /// Make all prior writes visible to subsequent searches.
    async fn refresh(&self) -> Result<(), StoreError>;

    /// Lazy, memory-bounded traversal of every hit matching `request`.
    fn scan(&self, request: SearchRequest, batch_size: usize) -> Scan<'_, Self>
    where
        Self: Sized,
    {
        Scan::new(self, request, batch_size)
    }
}
