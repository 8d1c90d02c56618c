//! The capability set every mount target implements.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Paths, Request, Response, Result, SystemView};

/// A pluggable backend (secret engine or auth method).
///
/// Any type implementing this trait can be mounted. The router hands it
/// requests whose `path` is relative to the mount point and whose `storage`
/// is scoped to the mount's namespace.
///
/// # Object Safety
///
/// This trait is object-safe: the router holds backends as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Handle a request.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Handled, nothing to return.
    /// * `Ok(Some(response))` - Handled, with a response.
    /// * `Err(Error)` - The backend failed; the router passes this through.
    async fn handle_request(&self, req: &mut Request) -> Result<Option<Response>>;

    /// Check whether the target of a request already exists.
    ///
    /// Returns `(exists, handled)`. `handled == false` means the backend has
    /// no opinion and the caller should fall back to its own rules.
    async fn handle_existence_check(&self, req: &mut Request) -> Result<(bool, bool)>;

    /// Special-path declarations. Read once, at mount time.
    fn special_paths(&self) -> Option<Paths>;

    /// Lease settings this backend runs under.
    fn system(&self) -> Arc<dyn SystemView>;

    /// Release resources. Called once, when the backend is unmounted.
    async fn cleanup(&self);
}
