//! The request handed to a backend.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::{Operation, Storage};

/// Network details about the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub remote_addr: String,
}

/// A request routed to a mounted backend.
///
/// Callers fill in the operation, path, data and token. The router owns
/// `mount_point` and `storage`: it sets both while the backend runs, and
/// removes the storage handle again before returning.
#[derive(Clone)]
pub struct Request {
    /// Unique identifier, used for correlating log lines.
    pub id: String,

    pub operation: Operation,

    /// Full path on the way in; mount-relative while a backend handles it.
    pub path: String,

    /// Request body.
    pub data: Map<String, Value>,

    pub client_token: String,

    /// The mount that served this request. Set by the router.
    pub mount_point: String,

    /// Storage scoped to the owning mount. Set by the router.
    pub storage: Option<Arc<dyn Storage>>,

    /// Caller connection. Only forwarded to backends for login paths.
    pub connection: Option<Connection>,

    /// Requested response-wrapping TTL. Zero means no wrapping requested.
    pub wrap_ttl: Duration,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            operation,
            path: path.into(),
            data: Map::new(),
            client_token: String::new(),
            mount_point: String::new(),
            storage: None,
            connection: None,
            wrap_ttl: Duration::ZERO,
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_wrap_ttl(mut self, ttl: Duration) -> Self {
        self.wrap_ttl = ttl;
        self
    }

    pub fn with_client_token(mut self, token: impl Into<String>) -> Self {
        self.client_token = token.into();
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connection = Some(connection);
        self
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("operation", &self.operation)
            .field("path", &self.path)
            .field("data", &self.data)
            .field("mount_point", &self.mount_point)
            .field("storage", &self.storage.as_ref().map(|_| "<storage>"))
            .field("connection", &self.connection)
            .field("wrap_ttl", &self.wrap_ttl)
            .finish_non_exhaustive()
    }
}
