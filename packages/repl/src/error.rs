//! Errors surfaced by the shell outside of individual commands.

use std::path::PathBuf;

use lockbox_router::RouterError;

use crate::io::IoError;

#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    #[error("cannot read mount table {path}: {source}")]
    MountFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mount table: {0}")]
    MountTable(#[from] serde_json::Error),

    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Io(#[from] IoError),
}
