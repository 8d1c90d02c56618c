//! Namespaced key/value storage handed to backends.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Bytes,
}

impl StorageEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Key/value storage.
///
/// `list` returns the names directly under `prefix`, relative to it. Nested
/// keys collapse into a single `name/` entry, so listing is one level deep.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>>;

    async fn put(&self, entry: StorageEntry) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.as_ref().list(prefix).await
    }

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        self.as_ref().get(key).await
    }

    async fn put(&self, entry: StorageEntry) -> Result<()> {
        self.as_ref().put(entry).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.as_ref().delete(key).await
    }
}

/// In-memory storage.
///
/// Keys are kept sorted, so `list` output is in lexical order.
#[derive(Default)]
pub struct InmemStorage {
    entries: RwLock<BTreeMap<String, Bytes>>,
}

impl InmemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl fmt::Debug for InmemStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InmemStorage")
            .field("entries", &"<locked>")
            .finish()
    }
}

#[async_trait]
impl Storage for InmemStorage {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        let mut out: Vec<String> = Vec::new();

        for key in entries.keys() {
            let Some(rest) = key.strip_prefix(prefix) else {
                continue;
            };
            let name = match rest.find('/') {
                Some(idx) => &rest[..=idx],
                None => rest,
            };
            if out.last().map(String::as_str) != Some(name) {
                out.push(name.to_string());
            }
        }

        Ok(out)
    }

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .map(|value| StorageEntry::new(key, value.clone())))
    }

    async fn put(&self, entry: StorageEntry) -> Result<()> {
        self.entries.write().await.insert(entry.key, entry.value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Storage restricted to one namespace of another storage.
///
/// Every key is prefixed with the view's namespace before it reaches the
/// inner storage, so two views with disjoint prefixes can never observe each
/// other's data. Keys that are absolute or contain `..` are rejected.
#[derive(Clone)]
pub struct StorageView {
    inner: Arc<dyn Storage>,
    prefix: String,
}

impl StorageView {
    pub fn new(inner: Arc<dyn Storage>, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    /// The namespace this view writes under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn expand_key(&self, key: &str) -> Result<String> {
        if key.starts_with('/') || key.split('/').any(|component| component == "..") {
            return Err(Error::invalid_request(format!(
                "key '{}' escapes its storage view",
                key
            )));
        }
        Ok(format!("{}{}", self.prefix, key))
    }

    fn truncate_key(&self, key: String) -> String {
        match key.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.to_string(),
            None => key,
        }
    }
}

impl fmt::Debug for StorageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageView")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Storage for StorageView {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let expanded = self.expand_key(prefix)?;
        self.inner.list(&expanded).await
    }

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        let expanded = self.expand_key(key)?;
        let entry = self.inner.get(&expanded).await?;
        Ok(entry.map(|mut entry| {
            entry.key = self.truncate_key(entry.key);
            entry
        }))
    }

    async fn put(&self, entry: StorageEntry) -> Result<()> {
        let key = self.expand_key(&entry.key)?;
        self.inner
            .put(StorageEntry {
                key,
                value: entry.value,
            })
            .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let expanded = self.expand_key(key)?;
        tracing::trace!(prefix = %self.prefix, key, "deleting key through view");
        self.inner.delete(&expanded).await
    }
}
