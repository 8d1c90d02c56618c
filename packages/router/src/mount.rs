//! Mount entries and the serializable mount table.
//!
//! A mount table is described in JSON:
//! ```json
//! {"entries": [
//!   {"uuid": "…", "path": "secret/", "type": "kv", "description": "static secrets"},
//!   {"uuid": "…", "path": "prod/aws/", "type": "kv", "tainted": true}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

/// Path separator. Mount paths always end with it.
pub const SEPARATOR: char = '/';

/// Make a mount path separator-terminated.
pub fn normalize_mount_path(path: &str) -> String {
    if path.ends_with(SEPARATOR) {
        path.to_string()
    } else {
        format!("{}{}", path, SEPARATOR)
    }
}

/// Per-mount tuning. Zero means "use the system default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Default lease TTL in seconds.
    #[serde(default)]
    pub default_lease_ttl: u64,
    /// Maximum lease TTL in seconds.
    #[serde(default)]
    pub max_lease_ttl: u64,
}

/// The record for one mount point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountEntry {
    /// Opaque unique identifier. Also names the mount's storage namespace.
    pub uuid: String,

    /// Separator-terminated mount path.
    pub path: String,

    /// Backend type, e.g. `kv`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub config: MountConfig,

    /// Set while the mount is being decommissioned.
    #[serde(default)]
    pub tainted: bool,
}

impl MountEntry {
    /// Create an entry with a fresh identifier.
    pub fn new(path: &str, kind: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            path: normalize_mount_path(path),
            kind: kind.into(),
            description: String::new(),
            config: MountConfig::default(),
            tainted: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_config(mut self, config: MountConfig) -> Self {
        self.config = config;
        self
    }
}

/// An ordered list of mount entries, as persisted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTable {
    #[serde(default)]
    pub entries: Vec<MountEntry>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from JSON, normalizing every path.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut table: MountTable = serde_json::from_str(json)?;
        for entry in &mut table.entries {
            entry.path = normalize_mount_path(&entry.path);
        }
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn add(&mut self, entry: MountEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_trailing_separator() {
        assert_eq!(normalize_mount_path("prod/aws"), "prod/aws/");
        assert_eq!(normalize_mount_path("prod/aws/"), "prod/aws/");
    }

    #[test]
    fn new_entry_is_normalized_and_untainted() {
        let entry = MountEntry::new("secret", "kv");
        assert_eq!(entry.path, "secret/");
        assert_eq!(entry.kind, "kv");
        assert!(!entry.tainted);
        assert!(uuid::Uuid::parse_str(&entry.uuid).is_ok());
    }

    #[test]
    fn entries_get_distinct_ids() {
        let a = MountEntry::new("a", "kv");
        let b = MountEntry::new("b", "kv");
        assert_ne!(a.uuid, b.uuid);
    }

    #[test]
    fn table_from_json() {
        let json = r#"{"entries": [
            {"uuid": "1", "path": "secret", "type": "kv"},
            {"uuid": "2", "path": "prod/aws/", "type": "kv", "tainted": true,
             "config": {"default_lease_ttl": 60}}
        ]}"#;

        let table = MountTable::from_json(json).unwrap();

        assert_eq!(table.len(), 2);
        let secret = &table.entries[0];
        assert_eq!(secret.path, "secret/");
        assert_eq!(secret.uuid, "1");
        assert!(!secret.tainted);

        let aws = &table.entries[1];
        assert_eq!(aws.uuid, "2");
        assert_eq!(aws.path, "prod/aws/");
        assert!(aws.tainted);
        assert_eq!(aws.config.default_lease_ttl, 60);
        assert_eq!(aws.config.max_lease_ttl, 0);
    }

    #[test]
    fn entry_serializes_kind_as_type() {
        let entry = MountEntry::new("secret/", "kv");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "kv");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn table_add_keeps_order() {
        let mut table = MountTable::new();
        table.add(MountEntry::new("secret/", "kv"));
        table.add(MountEntry::new("prod/aws/", "kv"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries[0].path, "secret/");
        assert_eq!(table.entries[1].path, "prod/aws/");
    }
}
