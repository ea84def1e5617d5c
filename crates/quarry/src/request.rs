mod builder;
pub use builder::Builder;

mod state;
pub use state::ProtocolState;

use crate::{codec::PagingState, Config, CursorToken, PageContinuation, ResponsePage};

use quarry_core::{
    driver::{SearchBackend, SearchRequest},
    request::SortOrder,
    Error, IndexTarget, PlanAttachment, PlanSerializer, RequestDescriptor, Result,
};

use std::{sync::Arc, time::Duration};
use tracing::{debug, info, trace, warn};

/// A stateful handle for one logical query, fetched page by page.
///
/// A request runs in one of two modes, fixed when it is built:
///
/// * **Single-shot**: one backend call returns the whole answer. Fetching
///   again returns an empty page without contacting the backend.
/// * **Cursor**: pages are read through a server-side cursor. Each call
///   carries the cursor binding and resumes after the sort key of the last
///   hit seen. The first empty page ends paging; the cursor is then released
///   by [`cleanup`](Self::cleanup).
///
/// The caller owns transport: every backend call goes through the
/// [`SearchBackend`] passed to each operation. A request is driven by one
/// caller at a time, which `&mut self` enforces.
pub struct QueryRequest {
    indices: IndexTarget,

    /// Request body, updated as paging advances
    descriptor: RequestDescriptor,

    /// Source fields the caller expects back
    includes: Vec<String>,

    plan: Arc<dyn PlanSerializer>,

    mode: Mode,
}

enum Mode {
    SingleShot { done: bool },
    Cursor(CursorPaging),
}

struct CursorPaging {
    keep_alive: Duration,
    token: Option<CursorToken>,
    continuation: PageContinuation,
    state: ProtocolState,
}

impl CursorPaging {
    /// The last page has been seen and the cursor has not been released.
    fn cleanup_needed(&self) -> bool {
        self.state == ProtocolState::ExhaustedPendingCleanup
    }
}

impl QueryRequest {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Fetches the next page.
    ///
    /// Once paging is over this returns an empty page without calling the
    /// backend, however many times it is called. A failed backend call or
    /// plan serialization leaves the protocol state untouched, so calling
    /// again with the same backend resumes from the same position.
    pub async fn fetch_page<B>(&mut self, backend: &mut B) -> Result<ResponsePage>
    where
        B: SearchBackend + ?Sized,
    {
        match self.mode {
            Mode::SingleShot { .. } => self.fetch_single_shot(backend).await,
            Mode::Cursor(_) => self.fetch_cursor_page(backend).await,
        }
    }

    async fn fetch_single_shot<B>(&mut self, backend: &mut B) -> Result<ResponsePage>
    where
        B: SearchBackend + ?Sized,
    {
        if let Mode::SingleShot { done: true } = self.mode {
            trace!(indices = %self.indices, "single-shot request already done");
            return Ok(ResponsePage::empty(self.includes.clone()));
        }

        // Read before the request is marked done.
        let is_count_only = self.is_count_only();

        self.attach_plan()?;

        let request = SearchRequest::new(self.indices.clone(), self.descriptor.clone());
        let response = backend.search(request).await?;

        self.mode = Mode::SingleShot { done: true };

        let page = ResponsePage::new(response, is_count_only, self.includes.clone());
        debug!(
            indices = %self.indices,
            hits = page.len(),
            count_only = is_count_only,
            "fetched single-shot page"
        );
        Ok(page)
    }

    async fn fetch_cursor_page<B>(&mut self, backend: &mut B) -> Result<ResponsePage>
    where
        B: SearchBackend + ?Sized,
    {
        let state = self.protocol_state();
        if state.is_exhausted() {
            trace!(indices = %self.indices, ?state, "cursor already exhausted");
            return Ok(ResponsePage::empty(self.includes.clone()));
        }

        let is_count_only = self.is_count_only();

        self.attach_plan()?;

        let Mode::Cursor(paging) = &mut self.mode else {
            unreachable!("fetch_cursor_page called on a single-shot request");
        };

        let descriptor = &mut self.descriptor;
        if let Some(token) = &paging.token {
            descriptor.cursor = Some(token.binding());
        }
        descriptor.timeout = Some(paging.keep_alive);

        if let Some(values) = paging.continuation.last_sort_values() {
            descriptor.search_after = Some(values.to_vec());
        }

        if !descriptor.has_sort() {
            for field in paging.continuation.tiebreak_fields() {
                descriptor.push_sort(field.clone(), SortOrder::Asc);
            }
        }

        let request = SearchRequest::new(self.indices.clone(), descriptor.clone())
            .with_cursor_keep_alive(paging.keep_alive);

        let mut response = if paging.continuation.is_resuming() {
            backend.continue_search(request).await?
        } else {
            backend.search(request).await?
        };

        // An empty id is no handle at all.
        if let Some(handle) = response.cursor_id.take().filter(|id| !id.is_empty()) {
            if paging.token.as_ref().map(CursorToken::handle) != Some(handle.as_str()) {
                debug!(indices = %self.indices, handle = %handle, "adopted cursor handle");
                paging.token = Some(CursorToken::new(handle, paging.keep_alive));
            }
        }

        let page = ResponsePage::new(response, is_count_only, self.includes.clone());

        if page.is_empty() {
            paging.state = ProtocolState::ExhaustedPendingCleanup;
        } else {
            paging.state = ProtocolState::Paging;

            if let Some(last) = page.hits().last() {
                paging.continuation.advance(last.sort.clone());
                self.descriptor.search_after = Some(last.sort.clone());
            }
        }

        debug!(
            indices = %self.indices,
            hits = page.len(),
            state = ?paging.state,
            "fetched cursor page"
        );
        Ok(page)
    }

    fn attach_plan(&mut self) -> Result<()> {
        let plan = PlanAttachment::produce(self.plan.as_ref())?;
        trace!(bytes = plan.len(), "attached plan");
        self.descriptor.plan = Some(plan);
        Ok(())
    }

    /// Releases the cursor once paging has reached its last page.
    ///
    /// The backend is asked to release the cursor only after an empty page
    /// has been fetched. Called earlier, the local handle is dropped without
    /// a release call and the server-side cursor is left to expire. Either
    /// way the handle is cleared before the backend is contacted, so a
    /// failed release still leaves the request in
    /// [`ProtocolState::ExhaustedClean`]. Calling this again is a no-op.
    pub async fn cleanup<B>(&mut self, backend: &mut B) -> Result<()>
    where
        B: SearchBackend + ?Sized,
    {
        self.release(backend, false).await
    }

    /// Releases the cursor regardless of how far paging got.
    ///
    /// Used when the caller abandons paging early.
    pub async fn force_cleanup<B>(&mut self, backend: &mut B) -> Result<()>
    where
        B: SearchBackend + ?Sized,
    {
        self.release(backend, true).await
    }

    async fn release<B>(&mut self, backend: &mut B, force: bool) -> Result<()>
    where
        B: SearchBackend + ?Sized,
    {
        // Single-shot requests never hold a cursor.
        let Mode::Cursor(paging) = &mut self.mode else {
            return Ok(());
        };

        let cleanup_needed = paging.cleanup_needed();

        // Clear local state first; it must end up cleared whether or not the
        // release below succeeds, or is even attempted.
        let token = paging.token.take();
        paging.state = ProtocolState::ExhaustedClean;
        self.descriptor.cursor = None;

        match token {
            Some(token) if force || cleanup_needed => {
                info!(indices = %self.indices, handle = token.handle(), force, "releasing cursor");
                backend.release_cursor(token.handle()).await
            }
            Some(token) => {
                warn!(
                    indices = %self.indices,
                    handle = token.handle(),
                    ttl = ?token.ttl(),
                    "cursor dropped before the last page; leaving it to expire"
                );
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// True while a cursor is held and its last page has not been reached.
    pub fn has_more_pages(&self) -> bool {
        match &self.mode {
            Mode::SingleShot { .. } => false,
            Mode::Cursor(paging) => paging.token.is_some() && !paging.cleanup_needed(),
        }
    }

    pub fn protocol_state(&self) -> ProtocolState {
        match &self.mode {
            Mode::SingleShot { done: false } => ProtocolState::Fresh,
            Mode::SingleShot { done: true } => ProtocolState::ExhaustedClean,
            Mode::Cursor(paging) => paging.state,
        }
    }

    /// True when the next fetch only asks the backend for a hit count.
    ///
    /// Always false once paging is over.
    pub fn is_count_only(&self) -> bool {
        !self.protocol_state().is_exhausted() && self.descriptor.is_count_only()
    }

    pub fn is_cursor_mode(&self) -> bool {
        matches!(self.mode, Mode::Cursor(_))
    }

    pub fn indices(&self) -> &IndexTarget {
        &self.indices
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// The cursor currently held, if any.
    ///
    /// Fails on single-shot requests, which never open a cursor.
    pub fn cursor_token(&self) -> Result<Option<&CursorToken>> {
        Ok(self.cursor_paging("cursor_token")?.token.as_ref())
    }

    /// Fails on single-shot requests.
    pub fn continuation(&self) -> Result<&PageContinuation> {
        Ok(&self.cursor_paging("continuation")?.continuation)
    }

    /// Fails on single-shot requests.
    pub fn cursor_keep_alive(&self) -> Result<Duration> {
        Ok(self.cursor_paging("cursor_keep_alive")?.keep_alive)
    }

    fn cursor_paging(&self, operation: &str) -> Result<&CursorPaging> {
        match &self.mode {
            Mode::Cursor(paging) => Ok(paging),
            Mode::SingleShot { .. } => Err(Error::unsupported_operation(format!(
                "`{operation}` requires a cursor-mode request"
            ))),
        }
    }

    /// Serializes the paging state so another process can continue it with
    /// [`decode`](Self::decode).
    ///
    /// Fails on single-shot requests.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let paging = self.cursor_paging("encode")?;

        let keep_alive_ms = u64::try_from(paging.keep_alive.as_millis()).map_err(|_| {
            Error::invalid_cursor_state(format!(
                "keep-alive does not fit in 64 bits of milliseconds; keep_alive={:?}",
                paging.keep_alive
            ))
        })?;

        PagingState {
            version: PagingState::VERSION,
            descriptor: self.descriptor.clone(),
            keep_alive_ms,
            handle: paging.token.as_ref().map(|token| token.handle().to_string()),
            indices: self.indices.clone(),
            includes: self.includes.clone(),
            last_sort_values: paging.continuation.last_sort_values().map(<[_]>::to_vec),
        }
        .encode()
    }

    /// [`encode`](Self::encode) rendered as a lowercase hex string.
    pub fn encode_token(&self) -> Result<String> {
        self.encode().map(hex::encode)
    }

    /// Rebuilds a cursor-mode request from [`encode`](Self::encode) output.
    ///
    /// A request that held a cursor resumes in [`ProtocolState::Paging`];
    /// one that did not is restored as [`ProtocolState::ExhaustedClean`].
    pub fn decode(bytes: &[u8], plan: Arc<dyn PlanSerializer>, config: &Config) -> Result<Self> {
        let state = PagingState::decode(bytes)?;
        let keep_alive = Duration::from_millis(state.keep_alive_ms);

        let tiebreak_fields = builder::checked_tiebreak_fields(config)?;
        let continuation = match state.last_sort_values {
            Some(values) => PageContinuation::resume(tiebreak_fields, values),
            None => PageContinuation::new(tiebreak_fields),
        };

        let token = state
            .handle
            .map(|handle| CursorToken::new(handle, keep_alive));
        let protocol_state = if token.is_some() {
            ProtocolState::Paging
        } else {
            ProtocolState::ExhaustedClean
        };

        Ok(Self {
            indices: state.indices,
            descriptor: state.descriptor,
            includes: state.includes,
            plan,
            mode: Mode::Cursor(CursorPaging {
                keep_alive,
                token,
                continuation,
                state: protocol_state,
            }),
        })
    }

    /// [`decode`](Self::decode) from a hex string produced by
    /// [`encode_token`](Self::encode_token).
    pub fn decode_token(
        token: &str,
        plan: Arc<dyn PlanSerializer>,
        config: &Config,
    ) -> Result<Self> {
        let bytes = hex::decode(token.trim()).map_err(|err| {
            Error::invalid_cursor_state(format!("cursor token is not valid hex: {err}"))
        })?;
        Self::decode(&bytes, plan, config)
    }
}

impl core::fmt::Debug for QueryRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut s = f.debug_struct("QueryRequest");
        s.field("indices", &self.indices)
            .field("descriptor", &self.descriptor)
            .field("state", &self.protocol_state());

        if let Mode::Cursor(paging) = &self.mode {
            s.field("token", &paging.token)
                .field("continuation", &paging.continuation);
        }

        s.finish()
    }
}
