use crate::SortValue;

use serde::{Deserialize, Serialize};

/// What the backend returned for one physical request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Hit>,

    /// Total number of matches, when the backend tracked it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hits: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<serde_json::Value>,

    /// Cursor handle issued or refreshed by this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_id: Option<String>,
}

/// A single raw search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub source: serde_json::Value,

    /// The hit's sort key, in sort clause order.
    #[serde(default)]
    pub sort: Vec<SortValue>,
}

impl SearchResponse {
    pub fn from_hits(hits: impl IntoIterator<Item = Hit>) -> Self {
        Self {
            hits: hits.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_total_hits(mut self, total_hits: u64) -> Self {
        self.total_hits = Some(total_hits);
        self
    }

    pub fn with_aggregations(mut self, aggregations: serde_json::Value) -> Self {
        self.aggregations = Some(aggregations);
        self
    }

    pub fn with_cursor_id(mut self, cursor_id: impl Into<String>) -> Self {
        self.cursor_id = Some(cursor_id.into());
        self
    }

    /// No hits and no aggregations.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty() && self.aggregations.is_none()
    }
}

impl Hit {
    pub fn new(id: impl Into<String>, source: serde_json::Value) -> Self {
        Self {
            id: Some(id.into()),
            source,
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort: impl IntoIterator<Item = SortValue>) -> Self {
        self.sort = sort.into_iter().collect();
        self
    }
}
