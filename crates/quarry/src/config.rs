use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults applied when building query requests.
///
/// Durations are carried as whole milliseconds in serialized form, so a
/// config section such as `{ "cursor_keep_alive_ms": 30000 }` can be
/// deserialized directly from the host application's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timeout for single-shot requests whose body carries none.
    #[serde(rename = "query_timeout_ms", with = "millis")]
    pub query_timeout: Duration,

    /// Time-to-live of a cursor between two page fetches.
    #[serde(rename = "cursor_keep_alive_ms", with = "millis")]
    pub cursor_keep_alive: Duration,

    /// Page size used when neither the builder nor the body sets one.
    pub page_size: i64,

    /// Ask the backend for an exact count over every match.
    pub track_total_hits_all: bool,

    /// Sort fields appended, ascending, to cursor requests that carry no
    /// sort. The pair must totally order documents so no hit is skipped or
    /// repeated between pages.
    pub tiebreak_fields: [String; 2],
}

impl Config {
    pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

    pub const DEFAULT_CURSOR_KEEP_ALIVE: Duration = Duration::from_secs(60);

    pub const DEFAULT_PAGE_SIZE: i64 = 200;

    /// Index order of the document within a shard.
    pub const DOC_ORDER_FIELD: &'static str = "_doc";

    pub const ID_FIELD: &'static str = "_id";
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_timeout: Self::DEFAULT_QUERY_TIMEOUT,
            cursor_keep_alive: Self::DEFAULT_CURSOR_KEEP_ALIVE,
            page_size: Self::DEFAULT_PAGE_SIZE,
            track_total_hits_all: false,
            tiebreak_fields: [Self::DOC_ORDER_FIELD.into(), Self::ID_FIELD.into()],
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).map_err(serde::ser::Error::custom)?;
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
