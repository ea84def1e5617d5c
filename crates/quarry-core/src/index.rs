use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// Expands a logical index name into the physical indices to search.
///
/// Implemented by the catalog that knows about aliases, patterns and
/// multi-index names. The request handle only ever sees the resolved list.
pub trait IndexResolver {
    fn resolve_index_names(&self, logical: &str) -> Result<Vec<String>>;
}

impl<F> IndexResolver for F
where
    F: Fn(&str) -> Result<Vec<String>>,
{
    fn resolve_index_names(&self, logical: &str) -> Result<Vec<String>> {
        self(logical)
    }
}

/// The resolved, ordered list of physical index names a request searches.
///
/// An `IndexTarget` always holds at least one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct IndexTarget {
    names: Vec<String>,
}

impl IndexTarget {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(Error::invalid_request("index target is empty"));
        }

        if let Some(position) = names.iter().position(|name| name.trim().is_empty()) {
            return Err(Error::invalid_request(format!(
                "index target has a blank name at position {position}"
            )));
        }

        Ok(Self { names })
    }

    /// Parses a comma-separated list such as `"logs-2024,logs-2025"`.
    ///
    /// Whitespace around each name is trimmed and empty segments are skipped.
    pub fn parse(names: &str) -> Result<Self> {
        Self::new(
            names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    /// Resolves a logical name through `resolver`.
    pub fn resolve(resolver: &impl IndexResolver, logical: &str) -> Result<Self> {
        let names = resolver.resolve_index_names(logical)?;
        Self::new(names).map_err(|err| {
            err.context(Error::invalid_request(format!(
                "`{logical}` did not resolve to any index"
            )))
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TryFrom<Vec<String>> for IndexTarget {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<IndexTarget> for Vec<String> {
    fn from(target: IndexTarget) -> Self {
        target.names
    }
}

impl core::fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.names.join(","))
    }
}
