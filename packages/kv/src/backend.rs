//! `KvBackend`: JSON objects stored as-is under their request path.

use std::sync::Arc;

use async_trait::async_trait;
use lockbox_logical::{
    Backend, Error, Operation, Paths, Request, Response, Result, StaticSystemView, Storage,
    StorageEntry, SystemView,
};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Type tag used in mount entries.
pub const BACKEND_TYPE: &str = "kv";

const HELP: &str = "The kv backend stores arbitrary JSON objects. \
Write an object to any path, read it back from the same path, \
list a directory by reading it with the list operation.";

/// A key/value backend over its mount's storage view.
///
/// # Example
///
/// ```rust,ignore
/// let backend = Arc::new(KvBackend::new());
/// router.mount(backend, "secret/", MountEntry::new("secret/", "kv"), Some(view)).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct KvBackend {
    paths: Paths,
    system: StaticSystemView,
}

impl KvBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare special paths, e.g. to expose part of the mount before login.
    pub fn with_special_paths(mut self, paths: Paths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_system_view(mut self, system: StaticSystemView) -> Self {
        self.system = system;
        self
    }

    async fn read(&self, storage: &dyn Storage, path: &str) -> Result<Option<Response>> {
        let Some(entry) = storage.get(path).await? else {
            return Ok(None);
        };
        let data: Map<String, Value> = serde_json::from_slice(&entry.value)?;
        Ok(Some(Response::with_data(data)))
    }

    async fn write(&self, storage: &dyn Storage, req: &Request) -> Result<Option<Response>> {
        if req.path.is_empty() || req.path.ends_with('/') {
            return Err(Error::invalid_request("cannot write to a directory"));
        }
        if req.data.is_empty() {
            return Err(Error::invalid_request("missing data fields"));
        }

        let bytes = serde_json::to_vec(&req.data)?;
        storage.put(StorageEntry::new(req.path.clone(), bytes)).await?;
        debug!(mount = %req.mount_point, path = %req.path, "stored secret");
        Ok(None)
    }

    async fn delete(&self, storage: &dyn Storage, req: &Request) -> Result<Option<Response>> {
        storage.delete(&req.path).await?;
        debug!(mount = %req.mount_point, path = %req.path, "deleted secret");
        Ok(None)
    }

    async fn list(&self, storage: &dyn Storage, path: &str) -> Result<Option<Response>> {
        let prefix = if path.is_empty() || path.ends_with('/') {
            path.to_string()
        } else {
            format!("{}/", path)
        };
        let keys = storage.list(&prefix).await?;

        let mut data = Map::new();
        data.insert("keys".to_string(), json!(keys));
        Ok(Some(Response::with_data(data)))
    }
}

fn storage_of(req: &Request) -> Result<Arc<dyn Storage>> {
    req.storage
        .clone()
        .ok_or_else(|| Error::other("missing storage view"))
}

#[async_trait]
impl Backend for KvBackend {
    async fn handle_request(&self, req: &mut Request) -> Result<Option<Response>> {
        let storage = storage_of(req)?;
        match req.operation {
            Operation::Read => self.read(storage.as_ref(), &req.path).await,
            Operation::Create | Operation::Update => self.write(storage.as_ref(), req).await,
            Operation::Delete => self.delete(storage.as_ref(), req).await,
            Operation::List => self.list(storage.as_ref(), &req.path).await,
            Operation::Help => {
                let mut data = Map::new();
                data.insert("help".to_string(), json!(HELP));
                Ok(Some(Response::with_data(data)))
            }
            // Nothing is leased and writes are atomic, so there is nothing to undo.
            Operation::Revoke | Operation::Renew | Operation::Rollback => Ok(None),
        }
    }

    async fn handle_existence_check(&self, req: &mut Request) -> Result<(bool, bool)> {
        let storage = storage_of(req)?;
        let exists = storage.get(&req.path).await?.is_some();
        Ok((exists, true))
    }

    fn special_paths(&self) -> Option<Paths> {
        Some(self.paths.clone())
    }

    fn system(&self) -> Arc<dyn SystemView> {
        Arc::new(self.system)
    }

    async fn cleanup(&self) {
        debug!("kv backend cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_logical::InmemStorage;

    fn request(op: Operation, path: &str, storage: &Arc<InmemStorage>) -> Request {
        let mut req = Request::new(op, path);
        req.storage = Some(storage.clone());
        req
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn write_then_read() {
        let backend = KvBackend::new();
        let storage = Arc::new(InmemStorage::new());

        let mut req = request(Operation::Update, "foo", &storage)
            .with_data(body(json!({"password": "hunter2"})));
        assert!(backend.handle_request(&mut req).await.unwrap().is_none());

        let mut req = request(Operation::Read, "foo", &storage);
        let resp = backend.handle_request(&mut req).await.unwrap().unwrap();
        assert_eq!(resp.data["password"], "hunter2");
    }

    #[tokio::test]
    async fn read_missing_is_none() {
        let backend = KvBackend::new();
        let storage = Arc::new(InmemStorage::new());

        let mut req = request(Operation::Read, "nothing", &storage);
        assert!(backend.handle_request(&mut req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_without_data_fails() {
        let backend = KvBackend::new();
        let storage = Arc::new(InmemStorage::new());

        let mut req = request(Operation::Create, "foo", &storage);
        let err = backend.handle_request(&mut req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn list_and_delete() {
        let backend = KvBackend::new();
        let storage = Arc::new(InmemStorage::new());

        for path in ["app/db", "app/cache", "app/nested/key"] {
            let mut req =
                request(Operation::Update, path, &storage).with_data(body(json!({"v": 1})));
            backend.handle_request(&mut req).await.unwrap();
        }

        let mut req = request(Operation::List, "app", &storage);
        let resp = backend.handle_request(&mut req).await.unwrap().unwrap();
        assert_eq!(resp.data["keys"], json!(["cache", "db", "nested/"]));

        let mut req = request(Operation::Delete, "app/db", &storage);
        backend.handle_request(&mut req).await.unwrap();

        let mut req = request(Operation::List, "app/", &storage);
        let resp = backend.handle_request(&mut req).await.unwrap().unwrap();
        assert_eq!(resp.data["keys"], json!(["cache", "nested/"]));
    }

    #[tokio::test]
    async fn existence_check_is_handled() {
        let backend = KvBackend::new();
        let storage = Arc::new(InmemStorage::new());

        let mut req = request(Operation::Create, "foo", &storage);
        assert_eq!(
            backend.handle_existence_check(&mut req).await.unwrap(),
            (false, true)
        );

        storage.put(StorageEntry::new("foo", "{}")).await.unwrap();
        assert_eq!(
            backend.handle_existence_check(&mut req).await.unwrap(),
            (true, true)
        );
    }

    #[tokio::test]
    async fn missing_storage_is_an_error() {
        let backend = KvBackend::new();
        let mut req = Request::new(Operation::Read, "foo");
        assert!(backend.handle_request(&mut req).await.is_err());
    }

    #[tokio::test]
    async fn drain_operations_are_no_ops() {
        let backend = KvBackend::new();
        let storage = Arc::new(InmemStorage::new());

        for op in [Operation::Rollback, Operation::Revoke, Operation::Renew] {
            let mut req = request(op, "foo", &storage);
            assert!(backend.handle_request(&mut req).await.unwrap().is_none());
        }
    }
}
