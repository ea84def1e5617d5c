//! Serialized form of a cursor-mode request, for handing paging off to
//! another process.
//!
//! The state is a CBOR map. Decoding reads the `version` key on its own
//! first, so a blob written by a different format version is reported as
//! such instead of as a shape mismatch.

use quarry_core::{err, Error, IndexTarget, RequestDescriptor, Result, SortValue};

use serde::{Deserialize, Serialize};

/// Upper bound on an encoded state accepted by [`PagingState::decode`].
const MAX_STATE_BYTES: usize = 1024 * 1024;

/// Everything needed to rebuild a cursor-mode request elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PagingState {
    pub(crate) version: u8,

    /// Request body; the plan attachment is never persisted
    pub(crate) descriptor: RequestDescriptor,

    pub(crate) keep_alive_ms: u64,

    pub(crate) handle: Option<String>,

    pub(crate) indices: IndexTarget,

    pub(crate) includes: Vec<String>,

    /// `Some(vec![])` and `None` are distinct: the first resumes after a hit
    /// that carried an empty sort key
    pub(crate) last_sort_values: Option<Vec<SortValue>>,
}

#[derive(Deserialize)]
struct Header {
    version: u8,
}

impl PagingState {
    pub(crate) const VERSION: u8 = 1;

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let mut state = self.clone();
        state.descriptor.plan = None;

        serde_cbor::to_vec(&state).map_err(|e| err!("failed to encode paging state: {e}"))
    }

    pub(crate) fn decode(src: &[u8]) -> Result<Self> {
        if src.len() > MAX_STATE_BYTES {
            return Err(Error::invalid_cursor_state(format!(
                "state is {} bytes; the limit is {MAX_STATE_BYTES}",
                src.len()
            )));
        }

        let header: Header = serde_cbor::from_slice(src).map_err(malformed)?;
        if header.version != Self::VERSION {
            return Err(Error::invalid_cursor_state(format!(
                "unsupported format version {}; expected {}",
                header.version,
                Self::VERSION
            )));
        }

        let state: Self = serde_cbor::from_slice(src).map_err(malformed)?;
        state.validate()?;
        Ok(state)
    }

    /// Rejects states no builder could have produced.
    fn validate(&self) -> Result<()> {
        if self.keep_alive_ms == 0 {
            return Err(Error::invalid_cursor_state("cursor keep-alive is zero"));
        }

        if self.handle.as_deref() == Some("") {
            return Err(Error::invalid_cursor_state("cursor handle is empty"));
        }

        if let Some(size) = self.descriptor.size.filter(|size| *size < 0) {
            return Err(Error::invalid_cursor_state(format!(
                "page size is negative; size={size}"
            )));
        }

        Ok(())
    }
}

fn malformed(e: serde_cbor::Error) -> Error {
    Error::invalid_cursor_state(format!("malformed paging state: {e}"))
}
