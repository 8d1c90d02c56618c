//! The router a shell session drives, plus the backends it can mount.

use std::path::Path;
use std::sync::Arc;

use lockbox_kv::KvBackend;
use lockbox_logical::{Backend, InmemStorage, Storage};
use lockbox_router::{
    setup_mounts, storage_view_for, system_view_for, BackendFactory, MountEntry, MountTable,
    Router, RouterError,
};
use tracing::debug;

use crate::error::ReplError;

/// Mount path used when no mount table is given.
pub const DEFAULT_MOUNT: &str = "secret/";

/// Builds backends by mount type.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFactory;

impl BackendFactory for BuiltinFactory {
    fn create(&self, entry: &MountEntry) -> Result<Arc<dyn Backend>, lockbox_logical::Error> {
        match entry.kind.as_str() {
            // "generic" is the older name for the same engine
            lockbox_kv::BACKEND_TYPE | "generic" => Ok(Arc::new(
                KvBackend::new().with_system_view(system_view_for(entry)),
            )),
            other => Err(lockbox_logical::Error::invalid_request(format!(
                "unknown backend type '{}'",
                other
            ))),
        }
    }
}

/// An in-process router with an in-memory barrier behind every mount.
pub struct Session {
    router: Router,
    barrier: Arc<dyn Storage>,
    factory: BuiltinFactory,
}

impl Session {
    /// A session with nothing mounted.
    pub fn empty() -> Self {
        Self {
            router: Router::new(),
            barrier: Arc::new(InmemStorage::new()),
            factory: BuiltinFactory,
        }
    }

    /// A session with a kv engine at `secret/`.
    pub async fn with_defaults() -> Result<Self, RouterError> {
        let mut table = MountTable::new();
        table.add(
            MountEntry::new(DEFAULT_MOUNT, lockbox_kv::BACKEND_TYPE)
                .with_description("key/value secret storage"),
        );
        Self::from_table(&table).await
    }

    /// A session restored from a mount table.
    pub async fn from_table(table: &MountTable) -> Result<Self, RouterError> {
        let session = Self::empty();
        setup_mounts(
            &session.router,
            table,
            &session.factory,
            Arc::clone(&session.barrier),
        )
        .await?;
        Ok(session)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Mount a new backend of type `kind` at `path`.
    pub async fn mount(&self, path: &str, kind: &str) -> Result<MountEntry, RouterError> {
        let entry = MountEntry::new(path, kind);
        let backend = self
            .factory
            .create(&entry)
            .map_err(|source| RouterError::Factory {
                path: entry.path.clone(),
                source,
            })?;

        let view: Arc<dyn Storage> = Arc::new(storage_view_for(&self.barrier, &entry));
        self.router
            .mount(backend, path, entry.clone(), Some(view))
            .await?;
        debug!(path = %entry.path, kind, "mounted from shell");
        Ok(entry)
    }

    /// The live mounts as a mount table, ready to be saved.
    pub async fn mount_table(&self) -> MountTable {
        MountTable {
            entries: self.router.list_mounts().await,
        }
    }
}

/// Read a mount table from a JSON file.
pub fn load_mount_table(path: &Path) -> Result<MountTable, ReplError> {
    let json = std::fs::read_to_string(path).map_err(|source| ReplError::MountFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(MountTable::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_mount_kv_at_secret() {
        let session = Session::with_defaults().await.unwrap();
        let mounts = session.router().list_mounts().await;

        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].path, "secret/");
        assert_eq!(mounts[0].kind, "kv");
    }

    #[tokio::test]
    async fn mount_unknown_type_fails() {
        let session = Session::empty();
        let err = session.mount("foo/", "database").await.unwrap_err();
        assert!(matches!(err, RouterError::Factory { .. }));
        assert!(session.router().list_mounts().await.is_empty());
    }

    #[tokio::test]
    async fn generic_is_an_alias_for_kv() {
        let session = Session::empty();
        session.mount("legacy", "generic").await.unwrap();
        assert_eq!(
            session.router().matching_mount("legacy/foo").await.as_deref(),
            Some("legacy/")
        );
    }

    #[tokio::test]
    async fn mount_table_round_trips_through_a_file() {
        let session = Session::with_defaults().await.unwrap();
        session.mount("prod/aws", "kv").await.unwrap();
        session.router().taint("prod/aws/").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mounts.json");
        std::fs::write(&file, session.mount_table().await.to_json().unwrap()).unwrap();

        let table = load_mount_table(&file).unwrap();
        let restored = Session::from_table(&table).await.unwrap();
        let mounts = restored.router().list_mounts().await;

        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].path, "prod/aws/");
        assert!(mounts[0].tainted);
        assert_eq!(mounts[1].path, "secret/");
    }

    #[test]
    fn missing_mount_file_is_reported() {
        let err = load_mount_table(Path::new("/nonexistent/mounts.json")).unwrap_err();
        assert!(matches!(err, ReplError::MountFile { .. }));
    }
}
