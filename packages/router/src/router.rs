//! The request router: maps request paths to mounted backends.
//!
//! The routing table is a `RadixTree` keyed by mount path. Every lookup and
//! every mutation takes the same table-wide lock, so a mount change is
//! visible to all routing that starts after it returns. Backends run after
//! the lock is released; a request that resolved its mount before an
//! unmount may still complete against the removed backend.

use std::fmt;
use std::sync::Arc;

use lockbox_logical::{Backend, Connection, Request, Response, Storage, SystemView};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::mount::normalize_mount_path;
use crate::wrapping::apply_wrapping;
use crate::{MountEntry, RadixTree, RouterError, SpecialPaths};

/// Everything the router keeps for one mount.
struct RouteEntry {
    backend: Arc<dyn Backend>,
    mount_entry: MountEntry,
    storage: Option<Arc<dyn Storage>>,
    root_paths: SpecialPaths,
    login_paths: SpecialPaths,
}

/// A resolved mount, cloned out of the table so the lock can be dropped.
struct Dispatch {
    backend: Arc<dyn Backend>,
    mount: String,
    original_path: String,
    original_connection: Option<Connection>,
}

/// Routes requests to mounted backends by longest-prefix match.
///
/// Construct one at startup and share it (`Arc<Router>`) with every
/// request-handling task.
///
/// # Example
///
/// ```rust,ignore
/// let router = Router::new();
/// router.mount(backend, "prod/aws/", MountEntry::new("prod/aws/", "kv"), Some(view)).await?;
///
/// // The backend sees "creds/deploy"
/// let mut req = Request::new(Operation::Read, "prod/aws/creds/deploy");
/// let resp = router.route(&mut req).await?;
/// ```
pub struct Router {
    root: RwLock<RadixTree<RouteEntry>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("root", &"<locked>")
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with no mounts.
    pub fn new() -> Self {
        Self {
            root: RwLock::new(RadixTree::new()),
        }
    }

    /// Mount a backend at `path`.
    ///
    /// Fails with `AlreadyMounted` when `path` equals, contains, or sits
    /// under an existing mount. The backend's special paths are read once,
    /// here. The entry's `path` is rewritten to the normalized mount path.
    pub async fn mount(
        &self,
        backend: Arc<dyn Backend>,
        path: &str,
        mut mount_entry: MountEntry,
        storage: Option<Arc<dyn Storage>>,
    ) -> Result<(), RouterError> {
        let path = normalize_mount_path(path);
        let mut root = self.root.write().await;

        if let Some(existing) = conflicting_mount(&root, &path) {
            warn!(path = %path, existing = %existing, "rejecting overlapping mount");
            return Err(RouterError::AlreadyMounted { existing });
        }

        let special = backend.special_paths().unwrap_or_default();
        mount_entry.path = path.clone();
        debug!(
            path = %path,
            uuid = %mount_entry.uuid,
            kind = %mount_entry.kind,
            "mounted backend"
        );

        root.insert(
            &path,
            RouteEntry {
                backend,
                mount_entry,
                storage,
                root_paths: SpecialPaths::new(&special.root),
                login_paths: SpecialPaths::new(&special.unauthenticated),
            },
        );
        Ok(())
    }

    /// Remove the mount registered exactly at `path` and clean up its backend.
    pub async fn unmount(&self, path: &str) -> Result<(), RouterError> {
        let path = normalize_mount_path(path);
        let removed = self.root.write().await.remove(&path);

        let Some(entry) = removed else {
            return Err(RouterError::NoMountFound { path });
        };

        debug!(path = %path, uuid = %entry.mount_entry.uuid, "unmounted backend");
        entry.backend.cleanup().await;
        Ok(())
    }

    /// Move a live mount from `from` to `to`.
    ///
    /// The backend, storage view, classifiers and tainted flag move with it;
    /// nothing is rebuilt and the backend is not cleaned up.
    pub async fn remount(&self, from: &str, to: &str) -> Result<(), RouterError> {
        let from = normalize_mount_path(from);
        let to = normalize_mount_path(to);
        let mut root = self.root.write().await;

        let Some(mut entry) = root.remove(&from) else {
            return Err(RouterError::NoMountFound { path: from });
        };

        if let Some(existing) = conflicting_mount(&root, &to) {
            root.insert(&from, entry);
            return Err(RouterError::AlreadyMounted { existing });
        }

        debug!(from = %from, to = %to, uuid = %entry.mount_entry.uuid, "remounted backend");
        entry.mount_entry.path = to.clone();
        root.insert(&to, entry);
        Ok(())
    }

    /// Stop normal traffic to the mount at `path`.
    ///
    /// Rollback and revoke requests still reach it.
    pub async fn taint(&self, path: &str) -> Result<(), RouterError> {
        self.set_tainted(path, true).await
    }

    /// Restore normal traffic to the mount at `path`.
    pub async fn untaint(&self, path: &str) -> Result<(), RouterError> {
        self.set_tainted(path, false).await
    }

    async fn set_tainted(&self, path: &str, tainted: bool) -> Result<(), RouterError> {
        let path = normalize_mount_path(path);
        let mut root = self.root.write().await;

        match root.get_mut(&path) {
            Some(entry) => {
                entry.mount_entry.tainted = tainted;
                debug!(path = %path, tainted, "updated mount taint");
                Ok(())
            }
            None => Err(RouterError::NoMountFound { path }),
        }
    }

    /// The mount path owning `path`, if any.
    pub async fn matching_mount(&self, path: &str) -> Option<String> {
        let root = self.root.read().await;
        root.longest_prefix(path).map(|(mount, _)| mount.to_string())
    }

    /// The storage view of the mount owning `path`.
    pub async fn matching_storage_view(&self, path: &str) -> Option<Arc<dyn Storage>> {
        let root = self.root.read().await;
        root.longest_prefix(path).and_then(|(_, entry)| entry.storage.clone())
    }

    /// The mount entry of the mount owning `path`.
    pub async fn matching_mount_entry(&self, path: &str) -> Option<MountEntry> {
        let root = self.root.read().await;
        root.longest_prefix(path).map(|(_, entry)| entry.mount_entry.clone())
    }

    /// The system view of the backend owning `path`.
    pub async fn matching_system_view(&self, path: &str) -> Option<Arc<dyn SystemView>> {
        let root = self.root.read().await;
        root.longest_prefix(path).map(|(_, entry)| entry.backend.system())
    }

    /// All live mounts, in lexical path order.
    pub async fn list_mounts(&self) -> Vec<MountEntry> {
        let root = self.root.read().await;
        root.iter().map(|(_, entry)| entry.mount_entry.clone()).collect()
    }

    /// Whether `path` requires root privileges.
    pub async fn root_path(&self, path: &str) -> bool {
        let root = self.root.read().await;
        match root.longest_prefix(path) {
            Some((mount, entry)) => entry.root_paths.matches(relative_path(path, mount)),
            None => false,
        }
    }

    /// Whether `path` may be accessed without authentication.
    pub async fn login_path(&self, path: &str) -> bool {
        let root = self.root.read().await;
        match root.longest_prefix(path) {
            Some((mount, entry)) => entry.login_paths.matches(relative_path(path, mount)),
            None => false,
        }
    }

    /// Route a request to the backend that owns its path.
    ///
    /// The backend sees the mount-relative path and the mount's storage.
    /// When this returns, `req.path` and `req.connection` are back to what the
    /// caller passed, `req.storage` is cleared, and `req.mount_point` names
    /// the mount that served the request. Backend errors are returned as-is.
    pub async fn route(&self, req: &mut Request) -> Result<Option<Response>, RouterError> {
        let dispatch = self.prepare(req).await?;
        let result = dispatch.backend.handle_request(req).await;
        restore(req, dispatch);

        let response = result?;
        Ok(apply_wrapping(req.wrap_ttl, response))
    }

    /// Route an existence check to the backend that owns the request's path.
    ///
    /// Returns `(exists, handled)` from the backend. Same resolution and
    /// restoration rules as `route`; no wrapping applies.
    pub async fn route_existence_check(
        &self,
        req: &mut Request,
    ) -> Result<(bool, bool), RouterError> {
        let dispatch = self.prepare(req).await?;
        let result = dispatch.backend.handle_existence_check(req).await;
        restore(req, dispatch);

        Ok(result?)
    }

    /// Resolve the owning mount and rewrite the request for its backend.
    async fn prepare(&self, req: &mut Request) -> Result<Dispatch, RouterError> {
        let root = self.root.read().await;

        let Some((mount, entry)) = root.longest_prefix(&req.path) else {
            trace!(path = %req.path, "no mount owns path");
            return Err(RouterError::UnsupportedPath);
        };

        if entry.mount_entry.tainted && !req.operation.is_drain() {
            trace!(mount, operation = %req.operation, "refusing request to tainted mount");
            return Err(RouterError::UnsupportedPath);
        }

        let Some(storage) = entry.storage.clone() else {
            warn!(mount, uuid = %entry.mount_entry.uuid, "mount has no storage view");
            return Err(RouterError::MissingStorage);
        };

        let mount = mount.to_string();
        let original_path = std::mem::take(&mut req.path);
        let relative = relative_path(&original_path, &mount).to_string();

        let login = entry.login_paths.matches(&relative);
        let original_connection = if login {
            req.connection.clone()
        } else {
            req.connection.take()
        };

        trace!(
            mount = %mount,
            path = %relative,
            operation = %req.operation,
            request_id = %req.id,
            "routing request"
        );

        req.path = relative;
        req.mount_point = mount.clone();
        req.storage = Some(storage);

        Ok(Dispatch {
            backend: Arc::clone(&entry.backend),
            mount,
            original_path,
            original_connection,
        })
    }
}

/// The part of `path` below `mount`. A lone separator means the mount root.
fn relative_path<'a>(path: &'a str, mount: &str) -> &'a str {
    match &path[mount.len()..] {
        "/" => "",
        rest => rest,
    }
}

/// Undo the rewrites `prepare` made, keeping the mount point.
fn restore(req: &mut Request, dispatch: Dispatch) {
    req.path = dispatch.original_path;
    req.mount_point = dispatch.mount;
    req.storage = None;
    req.connection = dispatch.original_connection;
}

/// The live mount that `path` would overlap, if any.
fn conflicting_mount(root: &RadixTree<RouteEntry>, path: &str) -> Option<String> {
    if let Some((existing, _)) = root.longest_prefix(path) {
        return Some(existing.to_string());
    }
    if root.has_key_with_prefix(path) {
        return root
            .iter()
            .map(|(key, _)| key)
            .find(|key| key.starts_with(path));
    }
    None
}
