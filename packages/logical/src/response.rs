//! The response a backend returns.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response-wrapping metadata.
///
/// When present, the response is meant to be packaged behind a single-use
/// token that expires after `ttl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapInfo {
    pub ttl: Duration,
}

impl WrapInfo {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

/// What a backend hands back for a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_info: Option<WrapInfo>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// The wrap TTL the backend asked for, zero when it asked for none.
    pub fn declared_wrap_ttl(&self) -> Duration {
        self.wrap_info
            .as_ref()
            .map(|info| info.ttl)
            .unwrap_or_default()
    }
}
