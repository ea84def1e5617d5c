use quarry_core::{request::CursorBinding, SortValue};

use std::time::Duration;

/// A backend-issued cursor handle and how long it lives between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorToken {
    handle: String,
    ttl: Duration,
}

impl CursorToken {
    pub fn new(handle: impl Into<String>, ttl: Duration) -> Self {
        Self {
            handle: handle.into(),
            ttl,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The binding attached to a request body to page through this cursor.
    pub fn binding(&self) -> CursorBinding {
        CursorBinding::new(self.handle.clone(), self.ttl)
    }
}

/// Where the next page of a cursor starts.
///
/// `tiebreak_fields` are the sort fields appended when the request has no
/// sort of its own. `last_sort_values` are the sort key of the last hit
/// returned so far, absent until a non-empty page has been seen.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContinuation {
    tiebreak_fields: [String; 2],
    last_sort_values: Option<Vec<SortValue>>,
}

impl PageContinuation {
    pub fn new(tiebreak_fields: [String; 2]) -> Self {
        Self {
            tiebreak_fields,
            last_sort_values: None,
        }
    }

    pub(crate) fn resume(tiebreak_fields: [String; 2], last_sort_values: Vec<SortValue>) -> Self {
        Self {
            tiebreak_fields,
            last_sort_values: Some(last_sort_values),
        }
    }

    pub fn tiebreak_fields(&self) -> &[String; 2] {
        &self.tiebreak_fields
    }

    pub fn last_sort_values(&self) -> Option<&[SortValue]> {
        self.last_sort_values.as_deref()
    }

    /// True once a position to resume from is known.
    pub fn is_resuming(&self) -> bool {
        self.last_sort_values.is_some()
    }

    pub(crate) fn advance(&mut self, last_sort_values: Vec<SortValue>) {
        self.last_sort_values = Some(last_sort_values);
    }
}
