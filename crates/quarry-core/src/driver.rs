mod request;
pub use request::SearchRequest;

mod response;
pub use response::{Hit, SearchResponse};

use crate::{async_trait, Result};

/// The transport seam between a query request and the search backend.
///
/// Quarry drives the paging protocol; implementations of this trait own the
/// network. Errors returned from any method are handed to the caller
/// unchanged and are never retried by quarry.
#[async_trait]
pub trait SearchBackend: Send {
    /// Issue a single-shot search or the first page of a cursor.
    async fn search(&mut self, request: SearchRequest) -> Result<SearchResponse>;

    /// Fetch a following page of an open cursor.
    ///
    /// Backends whose cursor pages use the same endpoint as the first page
    /// can rely on the default, which forwards to [`search`](Self::search).
    async fn continue_search(&mut self, request: SearchRequest) -> Result<SearchResponse> {
        self.search(request).await
    }

    /// Release a server-side cursor.
    async fn release_cursor(&mut self, handle: &str) -> Result<()>;
}

#[async_trait]
impl<B: SearchBackend + ?Sized> SearchBackend for Box<B> {
    async fn search(&mut self, request: SearchRequest) -> Result<SearchResponse> {
        (**self).search(request).await
    }

    async fn continue_search(&mut self, request: SearchRequest) -> Result<SearchResponse> {
        (**self).continue_search(request).await
    }

    async fn release_cursor(&mut self, handle: &str) -> Result<()> {
        (**self).release_cursor(handle).await
    }
}
