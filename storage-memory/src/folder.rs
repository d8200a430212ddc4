//! In-memory folder node with watch support.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tracing::warn;

use storage_traits::{
    FolderEvent, Result, StorageEntry, StorageFile, StorageFolder, StorageItem, WatchHandle,
};

use crate::file::MemoryFile;
use crate::stats::WatchStats;

/// Event channel capacity per subscriber. Tests never come close; a real
/// backend would apply its own buffering policy.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A mutable, watchable folder held in memory.
pub struct MemoryFolder {
    id: String,
    name: String,
    watchable: bool,
    stats: Mutex<Arc<WatchStats>>,
    parent: Mutex<Weak<MemoryFolder>>,
    inner: Arc<Mutex<FolderInner>>,
}

#[derive(Default)]
struct FolderInner {
    files: Vec<Arc<MemoryFile>>,
    folders: Vec<Arc<MemoryFolder>>,
    subscribers: Vec<Subscriber>,
    next_subscriber: u64,
}

struct Subscriber {
    token: u64,
    sender: mpsc::Sender<FolderEvent>,
}

impl MemoryFolder {
    /// Create a root folder owning a fresh [`WatchStats`] counter pair.
    pub fn new_root(id: impl Into<String>, name: impl Into<String>) -> Arc<Self> {
        Self::build(id, name, true)
    }

    /// Create a folder to be attached under a parent via [`add_folder`](Self::add_folder).
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Arc<Self> {
        Self::build(id, name, true)
    }

    /// Create a folder that reports no watch capability.
    pub fn new_unwatchable(id: impl Into<String>, name: impl Into<String>) -> Arc<Self> {
        Self::build(id, name, false)
    }

    fn build(id: impl Into<String>, name: impl Into<String>, watchable: bool) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            name: name.into(),
            watchable,
            stats: Mutex::new(Arc::new(WatchStats::default())),
            parent: Mutex::new(Weak::new()),
            inner: Arc::new(Mutex::new(FolderInner::default())),
        })
    }

    /// The tree's watch subscription counters.
    pub fn watch_stats(&self) -> Arc<WatchStats> {
        self.stats.lock().expect("stats lock poisoned").clone()
    }

    /// Attach a file and notify subscribers.
    pub fn add_file(self: &Arc<Self>, file: Arc<MemoryFile>) {
        *file.parent.lock().expect("parent lock poisoned") = Arc::downgrade(self);
        let entry = StorageEntry::File(file.clone());
        let mut inner = self.inner.lock().expect("folder lock poisoned");
        inner.files.push(file);
        Self::notify(&mut inner, FolderEvent::Added(entry));
    }

    /// Attach a subfolder (adopting this tree's stats) and notify subscribers.
    pub fn add_folder(self: &Arc<Self>, folder: Arc<MemoryFolder>) {
        *folder.parent.lock().expect("parent lock poisoned") = Arc::downgrade(self);
        folder.adopt_stats(self.watch_stats());
        let entry = StorageEntry::Folder(folder.clone());
        let mut inner = self.inner.lock().expect("folder lock poisoned");
        inner.folders.push(folder);
        Self::notify(&mut inner, FolderEvent::Added(entry));
    }

    /// Detach a child by id and notify subscribers. No-op for unknown ids.
    pub fn remove(self: &Arc<Self>, child_id: &str) {
        let mut inner = self.inner.lock().expect("folder lock poisoned");

        if let Some(pos) = inner.files.iter().position(|f| f.id() == child_id) {
            let file = inner.files.remove(pos);
            Self::notify(&mut inner, FolderEvent::Removed(StorageEntry::File(file)));
            return;
        }
        if let Some(pos) = inner.folders.iter().position(|f| f.id() == child_id) {
            let folder = inner.folders.remove(pos);
            Self::notify(
                &mut inner,
                FolderEvent::Removed(StorageEntry::Folder(folder)),
            );
        }
    }

    /// Look up an immediate child folder by id.
    pub fn folder(&self, child_id: &str) -> Option<Arc<MemoryFolder>> {
        let inner = self.inner.lock().expect("folder lock poisoned");
        inner.folders.iter().find(|f| f.id() == child_id).cloned()
    }

    /// Subtrees attached before the parent share one stats instance.
    fn adopt_stats(&self, stats: Arc<WatchStats>) {
        *self.stats.lock().expect("stats lock poisoned") = stats.clone();
        let inner = self.inner.lock().expect("folder lock poisoned");
        for child in &inner.folders {
            child.adopt_stats(stats.clone());
        }
    }

    fn notify(inner: &mut FolderInner, event: FolderEvent) {
        inner.subscribers.retain(|sub| {
            match sub.sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(token = sub.token, "watch channel full, dropping event");
                    true
                }
            }
        });
    }
}

impl StorageItem for MemoryFolder {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl StorageFolder for MemoryFolder {
    async fn children(&self) -> Result<Vec<StorageEntry>> {
        let inner = self.inner.lock().expect("folder lock poisoned");
        let mut entries: Vec<StorageEntry> =
            Vec::with_capacity(inner.files.len() + inner.folders.len());
        entries.extend(
            inner
                .folders
                .iter()
                .map(|f| StorageEntry::Folder(f.clone() as Arc<dyn StorageFolder>)),
        );
        entries.extend(
            inner
                .files
                .iter()
                .map(|f| StorageEntry::File(f.clone() as Arc<dyn StorageFile>)),
        );
        Ok(entries)
    }

    async fn parent(&self) -> Result<Option<Arc<dyn StorageFolder>>> {
        let parent = self.parent.lock().expect("parent lock poisoned").upgrade();
        Ok(parent.map(|p| p as Arc<dyn StorageFolder>))
    }

    async fn watch(&self) -> Result<Option<WatchHandle>> {
        if !self.watchable {
            return Ok(None);
        }

        let stats = self.watch_stats();
        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let token = {
            let mut inner = self.inner.lock().expect("folder lock poisoned");
            let token = inner.next_subscriber;
            inner.next_subscriber += 1;
            inner.subscribers.push(Subscriber { token, sender });
            token
        };
        stats.record_subscribe();

        let inner = Arc::clone(&self.inner);
        Ok(Some(WatchHandle::new(receiver, move || {
            inner
                .lock()
                .expect("folder lock poisoned")
                .subscribers
                .retain(|sub| sub.token != token);
            stats.record_unsubscribe();
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_children_lists_folders_then_files() {
        let root = MemoryFolder::new_root("root", "Music");
        let sub = MemoryFolder::new("d1", "Albums");
        root.add_folder(sub);
        root.add_file(MemoryFile::new("f1", "a.mp3", vec![]));

        let children = root.children().await.unwrap();
        assert_eq!(children.len(), 2);
        assert!(!children[0].is_file());
        assert!(children[1].is_file());
    }

    #[tokio::test]
    async fn test_parent_links_follow_attachment() {
        let root = MemoryFolder::new_root("root", "Music");
        let sub = MemoryFolder::new("d1", "Albums");
        root.add_folder(sub.clone());

        let parent = StorageFolder::parent(sub.as_ref()).await.unwrap().unwrap();
        assert_eq!(parent.id(), "root");
        assert!(StorageFolder::parent(root.as_ref()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_watch_delivers_add_and_remove() {
        let root = MemoryFolder::new_root("root", "Music");
        let mut handle = root.watch().await.unwrap().unwrap();
        let mut rx = handle.take_receiver().unwrap();

        root.add_file(MemoryFile::new("f1", "a.mp3", vec![]));
        match rx.recv().await.unwrap() {
            FolderEvent::Added(entry) => assert_eq!(entry.id(), "f1"),
            other => panic!("unexpected event: {:?}", other),
        }

        root.remove("f1");
        match rx.recv().await.unwrap() {
            FolderEvent::Removed(entry) => assert_eq!(entry.id(), "f1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_watch_stats_balance_on_unsubscribe() {
        let root = MemoryFolder::new_root("root", "Music");
        let stats = root.watch_stats();

        let handle = root.watch().await.unwrap().unwrap();
        assert_eq!(stats.subscribed(), 1);
        assert_eq!(stats.live(), 1);

        handle.unsubscribe();
        assert_eq!(stats.unsubscribed(), 1);
        assert_eq!(stats.live(), 0);
    }

    #[tokio::test]
    async fn test_nested_folders_share_stats() {
        let root = MemoryFolder::new_root("root", "Music");
        let sub = MemoryFolder::new("d1", "Albums");
        root.add_folder(sub.clone());

        let _h1 = root.watch().await.unwrap().unwrap();
        let _h2 = sub.watch().await.unwrap().unwrap();
        assert_eq!(root.watch_stats().subscribed(), 2);
    }

    #[tokio::test]
    async fn test_unwatchable_folder_returns_none() {
        let root = MemoryFolder::new_unwatchable("root", "Music");
        assert!(root.watch().await.unwrap().is_none());
    }
}
