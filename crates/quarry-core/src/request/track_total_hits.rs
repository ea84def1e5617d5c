use serde::{Deserialize, Serialize};

/// How precisely the backend should count the total number of matches.
///
/// `All` is the explicit "count every match" setting. It replaces the
/// backend-specific numeric sentinel some protocol versions use for the same
/// purpose, so callers never have to know which integer means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackTotalHits {
    /// Leave the backend's own default in place.
    #[default]
    Default,

    /// Count exactly up to the given number of matches.
    UpTo(u64),

    /// Count every match exactly.
    All,
}

impl TrackTotalHits {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}
