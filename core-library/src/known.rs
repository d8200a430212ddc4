//! Live index of files the folder scanner has discovered.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use storage_traits::{StorageFile, StorageItem};

/// The known-files index.
///
/// The folder scanner is the single writer (its reconciliation loop inserts
/// and removes entries); playlist parsing and image retrieval read from it.
/// Cloning is cheap and shares the underlying index.
#[derive(Clone, Default)]
pub struct KnownFiles {
    inner: Arc<RwLock<HashMap<String, Arc<dyn StorageFile>>>>,
}

impl KnownFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a discovered file. Returns false if the id was already known.
    pub async fn insert(&self, file: Arc<dyn StorageFile>) -> bool {
        let mut map = self.inner.write().await;
        map.insert(file.id().to_string(), file).is_none()
    }

    /// Drop a file by id. Returns whether it was present.
    pub async fn remove(&self, id: &str) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.contains_key(id)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<dyn StorageFile>> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Snapshot of all known file ids.
    pub async fn ids(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }
}

impl std::fmt::Debug for KnownFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnownFiles").finish_non_exhaustive()
    }
}
