use crate::{IndexTarget, RequestDescriptor};

use std::time::Duration;

/// A physical request handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Indices to search
    pub indices: IndexTarget,

    /// Request body, including the cursor binding and plan attachment
    pub source: RequestDescriptor,

    /// Set on cursor-mode requests. A backend that issues cursor handles on
    /// the first page opens one that lives this long and returns its id in
    /// [`SearchResponse::cursor_id`](super::SearchResponse::cursor_id).
    pub cursor_keep_alive: Option<Duration>,
}

impl SearchRequest {
    pub fn new(indices: IndexTarget, source: RequestDescriptor) -> Self {
        Self {
            indices,
            source,
            cursor_keep_alive: None,
        }
    }

    pub fn with_cursor_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.cursor_keep_alive = Some(keep_alive);
        self
    }

    /// The id of the cursor this request is bound to, if any.
    pub fn cursor_id(&self) -> Option<&str> {
        self.source.cursor.as_ref().map(|binding| binding.id.as_str())
    }
}
