use serde::{Deserialize, Serialize};

/// One component of a hit's sort key, as reported by the backend.
///
/// The request handle never interprets these beyond carrying them from the
/// last hit of one page into the resume token of the next request, so the
/// variants mirror the scalar shapes a search backend returns for sort keys.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<u64> for SortValue {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
