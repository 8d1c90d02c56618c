//! Lockbox router: mount table and request routing.
//!
//! This crate maps hierarchical request paths onto mounted backends:
//! - `RadixTree`: string-keyed prefix tree with longest-prefix lookup
//! - `SpecialPaths`: root-only and unauthenticated path classification
//! - `MountEntry` / `MountTable`: the records describing mounts
//! - `Router`: mount, unmount, remount, taint, untaint and route
//! - `resolve_wrap_ttl` / `apply_wrapping`: response-wrapping TTL rules
//!
//! # Example
//!
//! ```rust,ignore
//! use lockbox_router::{MountEntry, Router};
//!
//! let router = Router::new();
//! router.mount(backend, "secret/", MountEntry::new("secret/", "kv"), Some(view)).await?;
//! assert_eq!(router.matching_mount("secret/foo").await.as_deref(), Some("secret/"));
//! ```

mod error;
pub mod mount;
mod radix;
mod router;
mod setup;
mod special_paths;
pub mod wrapping;

pub use error::RouterError;
pub use mount::{normalize_mount_path, MountConfig, MountEntry, MountTable};
pub use radix::{Iter, RadixTree};
pub use router::Router;
pub use setup::{
    setup_mounts, storage_view_for, system_view_for, BackendFactory, BACKEND_BARRIER_PREFIX,
};
pub use special_paths::SpecialPaths;
pub use wrapping::{apply_wrapping, resolve_wrap_ttl};
