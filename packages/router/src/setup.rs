//! Bootstrapping a router from a mount table.

use std::sync::Arc;
use std::time::Duration;

use lockbox_logical::{Backend, StaticSystemView, Storage, StorageView};
use tracing::info;

use crate::{MountEntry, MountTable, Router, RouterError};

/// Namespace under which every mount's storage view lives.
///
/// Each mount gets `logical/<uuid>/`, so views never overlap even when a
/// mount is moved to a new path.
pub const BACKEND_BARRIER_PREFIX: &str = "logical/";

/// Creates backends for mount entries.
pub trait BackendFactory: Send + Sync {
    fn create(&self, entry: &MountEntry) -> Result<Arc<dyn Backend>, lockbox_logical::Error>;
}

/// Storage view for a mount entry, carved out of `barrier`.
pub fn storage_view_for(barrier: &Arc<dyn Storage>, entry: &MountEntry) -> StorageView {
    StorageView::new(
        Arc::clone(barrier),
        format!("{}{}/", BACKEND_BARRIER_PREFIX, entry.uuid),
    )
}

/// System view for a mount entry: the defaults, with non-zero
/// `MountConfig` values taking their place.
pub fn system_view_for(entry: &MountEntry) -> StaticSystemView {
    let mut view = StaticSystemView::default();
    if entry.config.default_lease_ttl > 0 {
        view.default_lease_ttl = Duration::from_secs(entry.config.default_lease_ttl);
    }
    if entry.config.max_lease_ttl > 0 {
        view.max_lease_ttl = Duration::from_secs(entry.config.max_lease_ttl);
    }
    view
}

/// Mount every entry of `table` on `router`.
///
/// Entries keep their tainted flag, so a mount that was being
/// decommissioned stays draining. Stops at the first failure.
pub async fn setup_mounts(
    router: &Router,
    table: &MountTable,
    factory: &dyn BackendFactory,
    barrier: Arc<dyn Storage>,
) -> Result<(), RouterError> {
    for entry in &table.entries {
        let backend = factory
            .create(entry)
            .map_err(|source| RouterError::Factory {
                path: entry.path.clone(),
                source,
            })?;

        let view: Arc<dyn Storage> = Arc::new(storage_view_for(&barrier, entry));
        router
            .mount(backend, &entry.path, entry.clone(), Some(view))
            .await?;
        info!(path = %entry.path, kind = %entry.kind, tainted = entry.tainted, "restored mount");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MountConfig;

    #[test]
    fn storage_views_are_namespaced_by_uuid() {
        let barrier: Arc<dyn Storage> = Arc::new(lockbox_logical::InmemStorage::new());
        let entry = MountEntry::new("secret/", "kv");
        let view = storage_view_for(&barrier, &entry);
        assert_eq!(view.prefix(), format!("logical/{}/", entry.uuid));
    }

    #[test]
    fn mount_config_overrides_lease_ttls() {
        let defaults = StaticSystemView::default();

        let entry = MountEntry::new("secret/", "kv");
        assert_eq!(system_view_for(&entry), defaults);

        let entry = MountEntry::new("secret/", "kv").with_config(MountConfig {
            default_lease_ttl: 60,
            max_lease_ttl: 0,
        });
        let view = system_view_for(&entry);
        assert_eq!(view.default_lease_ttl, Duration::from_secs(60));
        assert_eq!(view.max_lease_ttl, defaults.max_lease_ttl);
    }
}
