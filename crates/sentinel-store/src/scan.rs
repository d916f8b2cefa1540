//! Cursor traversal over a search result set, one bounded page at a time.

use crate::error::StoreError;
use crate::query::SearchRequest;
use crate::store::DocumentStore;
use crate::types::Hit;

#[derive(Debug, Clone, Copy)]
enum Cursor {
    NotStarted,
    Open,
    Exhausted,
}

/// Lazy sequence of hit batches backed by a scroll cursor.
///
/// Holds at most one page in memory. The server-side cursor is cleared as
/// soon as the last page is seen or a page request fails.
pub struct Scan<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    request: SearchRequest,
    batch_size: usize,
    scroll_id: Option<String>,
    cursor: Cursor,
}

impl<'a, S: DocumentStore + ?Sized> Scan<'a, S> {
    pub fn new(store: &'a S, request: SearchRequest, batch_size: usize) -> Self {
        Self {
            store,
            request,
            batch_size: batch_size.max(1),
            scroll_id: None,
            cursor: Cursor::NotStarted,
        }
    }

    /// Fetch the next batch, or `None` when the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the store error of the failing page request. The scan is
    /// exhausted afterwards.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<Hit>>, StoreError> {
        let page = match (self.cursor, self.scroll_id.as_deref()) {
            (Cursor::Exhausted, _) => return Ok(None),
            (Cursor::NotStarted, _) => {
                self.store
                    .open_scroll(&self.request, self.batch_size)
                    .await
            }
            (Cursor::Open, Some(id)) => self.store.continue_scroll(id).await,
            (Cursor::Open, None) => {
                self.cursor = Cursor::Exhausted;
                return Ok(None);
            }
        };

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                self.finish().await;
                return Err(e);
            }
        };

        self.cursor = Cursor::Open;
        if page.scroll_id.is_some() {
            self.scroll_id = page.scroll_id;
        }

        if page.hits.is_empty() {
            self.finish().await;
            return Ok(None);
        }
        if page.hits.len() < self.batch_size {
            self.finish().await;
        }
        Ok(Some(page.hits))
    }

    async fn finish(&mut self) {
        self.cursor = Cursor::Exhausted;
        if let Some(id) = self.scroll_id.take() {
            if let Err(e) = self.store.clear_scroll(&id).await {
                tracing::warn!(error = %e, "failed to clear scroll cursor");
            }
        }
    }
}
