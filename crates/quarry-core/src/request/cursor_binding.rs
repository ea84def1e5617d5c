use super::duration_ms;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Binds a request to a server-side cursor and asks the backend to keep it
/// alive for `keep_alive` past this call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorBinding {
    pub id: String,

    #[serde(rename = "keep_alive_ms", with = "duration_ms::required")]
    pub keep_alive: Duration,
}

impl CursorBinding {
    pub fn new(id: impl Into<String>, keep_alive: Duration) -> Self {
        Self {
            id: id.into(),
            keep_alive,
        }
    }
}
