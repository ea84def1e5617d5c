use quarry_core::{driver::Hit, driver::SearchResponse, Error, Result};

use serde::de::DeserializeOwned;
use std::ops::Deref;

/// The result of one paging step.
///
/// Pages are built once from the backend response and never change
/// afterwards. Rows are kept raw: turning hits into typed values is the
/// caller's job, with [`decode_rows`](Self::decode_rows) covering the common
/// case of deserializing each hit's source.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePage {
    hits: Vec<Hit>,
    total_hits: Option<u64>,
    aggregations: Option<serde_json::Value>,
    is_empty: bool,
    is_count_only: bool,
    includes: Vec<String>,
}

impl ResponsePage {
    pub(crate) fn new(
        response: SearchResponse,
        is_count_only: bool,
        includes: Vec<String>,
    ) -> Self {
        let is_empty = response.is_empty();

        Self {
            hits: response.hits,
            total_hits: response.total_hits,
            aggregations: response.aggregations,
            is_empty,
            is_count_only,
            includes,
        }
    }

    /// A page returned without contacting the backend.
    pub(crate) fn empty(includes: Vec<String>) -> Self {
        Self::new(SearchResponse::default(), false, includes)
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// No hits and no aggregations.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// True when the request that produced this page only asked for a count.
    pub fn is_count_only(&self) -> bool {
        self.is_count_only
    }

    pub fn total_hits(&self) -> Option<u64> {
        self.total_hits
    }

    pub fn aggregations(&self) -> Option<&serde_json::Value> {
        self.aggregations.as_ref()
    }

    /// Source fields the caller expects each row to carry.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Deserializes each hit's source into `T`, in hit order.
    pub fn decode_rows<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.hits
            .iter()
            .enumerate()
            .map(|(position, hit)| {
                T::deserialize(&hit.source).map_err(|err| {
                    Error::from(err).context(quarry_core::err!(
                        "failed to decode hit {} (id={:?})",
                        position,
                        hit.id
                    ))
                })
            })
            .collect()
    }
}

// Allow using pages like a regular slice of hits.
impl Deref for ResponsePage {
    type Target = [Hit];

    fn deref(&self) -> &Self::Target {
        &self.hits
    }
}
