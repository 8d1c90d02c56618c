//! Error types for mount-table and routing operations.

/// Errors raised by the router.
///
/// Mutation operations report precise kinds so callers can tell "already
/// exists" from "not found". Routing failures collapse into
/// `UnsupportedPath` so unauthenticated callers learn nothing about the
/// mount layout.
#[derive(thiserror::Error, Debug)]
pub enum RouterError {
    /// The new mount path equals, contains, or sits under a live mount.
    #[error("cannot mount under existing mount '{existing}'")]
    AlreadyMounted { existing: String },

    /// No mount is registered at exactly this path.
    #[error("no mount at '{path}'")]
    NoMountFound { path: String },

    /// No mount owns the path, or the owning mount is tainted.
    #[error("unsupported path")]
    UnsupportedPath,

    /// A resolved mount has no storage view.
    #[error("missing storage view for mount")]
    MissingStorage,

    /// A backend factory could not build the backend for a mount.
    #[error("failed to create backend for mount '{path}': {source}")]
    Factory {
        path: String,
        #[source]
        source: lockbox_logical::Error,
    },

    /// The backend failed. Passed through untouched.
    #[error(transparent)]
    Backend(#[from] lockbox_logical::Error),
}
