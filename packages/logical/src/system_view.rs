//! Read-only view of system-wide settings exposed to a backend.

use std::time::Duration;

/// Lease settings a backend runs under.
pub trait SystemView: Send + Sync {
    /// Lease TTL applied when a backend does not pick one.
    fn default_lease_ttl(&self) -> Duration;

    /// Upper bound for any lease the backend issues.
    fn max_lease_ttl(&self) -> Duration;
}

/// A `SystemView` with fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSystemView {
    pub default_lease_ttl: Duration,
    pub max_lease_ttl: Duration,
}

impl Default for StaticSystemView {
    fn default() -> Self {
        Self {
            default_lease_ttl: Duration::from_secs(24 * 60 * 60),
            max_lease_ttl: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

impl SystemView for StaticSystemView {
    fn default_lease_ttl(&self) -> Duration {
        self.default_lease_ttl
    }

    fn max_lease_ttl(&self) -> Duration {
        self.max_lease_ttl
    }
}
