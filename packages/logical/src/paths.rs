//! Special-path declarations a backend publishes at mount time.

use serde::{Deserialize, Serialize};

/// Paths a backend wants treated specially, relative to its mount point.
///
/// Each entry is either a literal path (`"login"`) or a literal prefix
/// followed by `*` (`"oauth/*"`), which covers everything beginning with
/// that prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paths {
    /// Paths that require root privileges.
    #[serde(default)]
    pub root: Vec<String>,

    /// Paths reachable without authentication.
    #[serde(default)]
    pub unauthenticated: Vec<String>,
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_unauthenticated<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unauthenticated
            .extend(patterns.into_iter().map(Into::into));
        self
    }
}
