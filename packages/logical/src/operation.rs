//! Request operation kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of work a request asks a backend to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    #[default]
    Read,
    Update,
    Delete,
    List,
    Help,
    /// Revoke a lease issued by the backend.
    Revoke,
    /// Renew a lease issued by the backend.
    Renew,
    /// Undo partially-applied work after a failure.
    Rollback,
}

impl Operation {
    /// Operations that still reach a tainted (draining) mount.
    ///
    /// Outstanding leases must be revocable and partial work must be rolled
    /// back while a mount is being decommissioned.
    pub fn is_drain(self) -> bool {
        matches!(self, Operation::Rollback | Operation::Revoke)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::Help => "help",
            Operation::Revoke => "revoke",
            Operation::Renew => "renew",
            Operation::Rollback => "rollback",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operation: {0}")]
pub struct ParseOperationError(pub String);

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Operation::Create),
            "read" => Ok(Operation::Read),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            "list" => Ok(Operation::List),
            "help" => Ok(Operation::Help),
            "revoke" => Ok(Operation::Revoke),
            "renew" => Ok(Operation::Renew),
            "rollback" => Ok(Operation::Rollback),
            other => Err(ParseOperationError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rollback_and_revoke_drain() {
        let draining: Vec<_> = [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
            Operation::List,
            Operation::Help,
            Operation::Revoke,
            Operation::Renew,
            Operation::Rollback,
        ]
        .into_iter()
        .filter(|op| op.is_drain())
        .collect();

        assert_eq!(draining, vec![Operation::Revoke, Operation::Rollback]);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("ROLLBACK".parse::<Operation>(), Ok(Operation::Rollback));
        assert_eq!("list".parse::<Operation>(), Ok(Operation::List));
        assert!("frobnicate".parse::<Operation>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Operation::Update).unwrap();
        assert_eq!(json, "\"update\"");
        let op: Operation = serde_json::from_str("\"revoke\"").unwrap();
        assert_eq!(op, Operation::Revoke);
    }
}
