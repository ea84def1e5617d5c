mod cursor_binding;
pub use cursor_binding::CursorBinding;

mod duration_ms;

mod sort;
pub use sort::{SortField, SortOrder};

mod track_total_hits;
pub use track_total_hits::TrackTotalHits;

use crate::{PlanAttachment, Result, SortValue};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The search body sent with every request.
///
/// Quarry only touches the fields it has to drive the paging protocol:
/// size, timeout, sort, hit tracking, the cursor binding, the resume token
/// and the plan attachment. Everything else the caller put in the body
/// (query, filters, aggregations, source filtering) is kept in `extra` and
/// passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,

    #[serde(
        default,
        rename = "timeout_ms",
        with = "duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortField>>,

    #[serde(default, skip_serializing_if = "TrackTotalHits::is_default")]
    pub track_total_hits: TrackTotalHits,

    /// Point-in-time style binding to a server-side cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorBinding>,

    /// Sort values of the last hit already returned. The backend resumes
    /// strictly after them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_after: Option<Vec<SortValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanAttachment>,

    /// Opaque passthrough for the rest of the body.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RequestDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a descriptor from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the descriptor in its JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_track_total_hits(mut self, track_total_hits: TrackTotalHits) -> Self {
        self.track_total_hits = track_total_hits;
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.push_sort(field, order);
        self
    }

    /// Sets a passthrough body entry such as `query` or `aggregations`.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn push_sort(&mut self, field: impl Into<String>, order: SortOrder) {
        self.sort
            .get_or_insert_with(Vec::new)
            .push(SortField::new(field, order));
    }

    pub fn has_sort(&self) -> bool {
        self.sort.is_some()
    }

    /// True when the body asks for a hit count only: no documents and an
    /// exact total over every match.
    pub fn is_count_only(&self) -> bool {
        self.size == Some(0) && self.track_total_hits.is_all()
    }
}
