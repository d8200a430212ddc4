//! Arena-owned folder index and pure reconciliation.
//!
//! Folders live in an indexed arena; the id-to-key map replaces nested
//! dictionaries keyed by folder identifier, so recursive removal never
//! mutates a map it is iterating. Reconciliation of one change event is a
//! pure function over the index returning the side effects the async layer
//! must perform (subscribe, unsubscribe, descend, known-file updates).

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use storage_traits::{FolderEvent, StorageEntry, StorageFile, StorageFolder, StorageItem, WatchHandle};

/// Stable handle to a folder slot in the arena.
pub type FolderKey = usize;

/// One registered folder.
pub struct FolderNode {
    pub folder: Arc<dyn StorageFolder>,
    pub parent: Option<FolderKey>,
    /// Known immediate subfolders, id to arena key
    pub child_folders: HashMap<String, FolderKey>,
    /// Known immediate file ids
    pub child_files: BTreeSet<String>,
    /// Live watch registration, if the folder supports one. The event
    /// receiver is taken by the pump task; the handle held here carries the
    /// unsubscribe side.
    pub watch: Option<WatchHandle>,
}

/// Arena of every folder the scanner currently knows.
#[derive(Default)]
pub struct ScanIndex {
    slots: Vec<Option<FolderNode>>,
    by_id: HashMap<String, FolderKey>,
}

/// A side effect the reconciliation loop must perform after the index has
/// been updated.
pub enum ReconcileAction {
    /// A new file must be added to the known-files index
    FileAdded(Arc<dyn StorageFile>),
    /// A file id must be dropped from the known-files index
    FileRemoved(String),
    /// A newly added folder must be registered (watch + enumerate) and
    /// descended into
    Descend {
        key: FolderKey,
        folder: Arc<dyn StorageFolder>,
    },
    /// A watch owned by a removed folder must be released
    Unsubscribe(WatchHandle),
}

impl ScanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder under an optional parent. Re-registering an id
    /// returns the existing key.
    pub fn insert_folder(
        &mut self,
        folder: Arc<dyn StorageFolder>,
        parent: Option<FolderKey>,
    ) -> FolderKey {
        if let Some(&key) = self.by_id.get(folder.id()) {
            return key;
        }

        let key = self.slots.len();
        self.by_id.insert(folder.id().to_string(), key);
        if let Some(parent_key) = parent {
            if let Some(parent_node) = self.node_mut(parent_key) {
                parent_node
                    .child_folders
                    .insert(folder.id().to_string(), key);
            }
        }
        self.slots.push(Some(FolderNode {
            folder,
            parent,
            child_folders: HashMap::new(),
            child_files: BTreeSet::new(),
            watch: None,
        }));
        key
    }

    pub fn key_of(&self, folder_id: &str) -> Option<FolderKey> {
        self.by_id.get(folder_id).copied()
    }

    pub fn node(&self, key: FolderKey) -> Option<&FolderNode> {
        self.slots.get(key).and_then(|slot| slot.as_ref())
    }

    pub fn node_mut(&mut self, key: FolderKey) -> Option<&mut FolderNode> {
        self.slots.get_mut(key).and_then(|slot| slot.as_mut())
    }

    /// Record a discovered file under its parent folder.
    pub fn record_file(&mut self, parent: FolderKey, file_id: &str) {
        if let Some(node) = self.node_mut(parent) {
            node.child_files.insert(file_id.to_string());
        }
    }

    /// Attach a live watch registration to a folder.
    pub fn attach_watch(&mut self, key: FolderKey, watch: WatchHandle) {
        if let Some(node) = self.node_mut(key) {
            node.watch = Some(watch);
        }
    }

    /// Number of registered folders.
    pub fn folder_count(&self) -> usize {
        self.by_id.len()
    }

    /// Remove a folder and its entire known subtree.
    ///
    /// Returns the file ids that disappeared and every watch handle the
    /// subtree owned, deepest first.
    pub fn remove_subtree(&mut self, key: FolderKey) -> (Vec<String>, Vec<WatchHandle>) {
        let mut files = Vec::new();
        let mut watches = Vec::new();
        self.remove_subtree_into(key, &mut files, &mut watches);
        (files, watches)
    }

    fn remove_subtree_into(
        &mut self,
        key: FolderKey,
        files: &mut Vec<String>,
        watches: &mut Vec<WatchHandle>,
    ) {
        let Some(node) = self.slots.get_mut(key).and_then(Option::take) else {
            return;
        };

        for (_, child_key) in node.child_folders {
            self.remove_subtree_into(child_key, files, watches);
        }
        files.extend(node.child_files);
        if let Some(watch) = node.watch {
            watches.push(watch);
        }
        self.by_id.remove(node.folder.id());
        if let Some(parent_key) = node.parent {
            if let Some(parent) = self.node_mut(parent_key) {
                parent.child_folders.remove(node.folder.id());
            }
        }
    }

    /// Detach every live watch handle, for scanner disposal.
    pub fn take_all_watches(&mut self) -> Vec<WatchHandle> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut())
            .filter_map(|node| node.watch.take())
            .collect()
    }
}

/// Apply one folder event to the index.
///
/// Pure with respect to the outside world: all storage and known-files side
/// effects are returned as [`ReconcileAction`]s for the caller to run.
pub fn reconcile(
    index: &mut ScanIndex,
    folder_key: FolderKey,
    event: FolderEvent,
) -> Vec<ReconcileAction> {
    if index.node(folder_key).is_none() {
        // The folder was removed while this event was in flight.
        return Vec::new();
    }

    match event {
        FolderEvent::Added(StorageEntry::File(file)) => {
            index.record_file(folder_key, file.id());
            vec![ReconcileAction::FileAdded(file)]
        }
        FolderEvent::Added(StorageEntry::Folder(folder)) => {
            let key = index.insert_folder(folder.clone(), Some(folder_key));
            vec![ReconcileAction::Descend { key, folder }]
        }
        FolderEvent::Removed(entry) => {
            let id = entry.id().to_string();
            let Some(node) = index.node_mut(folder_key) else {
                return Vec::new();
            };

            if node.child_files.remove(&id) {
                return vec![ReconcileAction::FileRemoved(id)];
            }

            let Some(&child_key) = node.child_folders.get(&id) else {
                return Vec::new();
            };
            let (files, watches) = index.remove_subtree(child_key);
            files
                .into_iter()
                .map(ReconcileAction::FileRemoved)
                .chain(watches.into_iter().map(ReconcileAction::Unsubscribe))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_memory::{MemoryFile, MemoryFolder};

    #[tokio::test]
    async fn test_added_file_records_and_reports() {
        let mut index = ScanIndex::new();
        let root = MemoryFolder::new_root("root", "Music");
        let key = index.insert_folder(root, None);

        let file = MemoryFile::new("f1", "a.mp3", vec![]);
        let actions = reconcile(
            &mut index,
            key,
            FolderEvent::Added(StorageEntry::File(file)),
        );

        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], ReconcileAction::FileAdded(_)));
        assert!(index.node(key).unwrap().child_files.contains("f1"));
    }

    #[tokio::test]
    async fn test_added_folder_requests_descend() {
        let mut index = ScanIndex::new();
        let root = MemoryFolder::new_root("root", "Music");
        let key = index.insert_folder(root, None);

        let sub = MemoryFolder::new("d1", "Albums");
        let actions = reconcile(
            &mut index,
            key,
            FolderEvent::Added(StorageEntry::Folder(sub)),
        );

        assert!(matches!(actions[0], ReconcileAction::Descend { .. }));
        assert_eq!(index.folder_count(), 2);
        assert!(index.key_of("d1").is_some());
    }

    #[tokio::test]
    async fn test_removed_folder_drops_whole_subtree() {
        let mut index = ScanIndex::new();
        let root = MemoryFolder::new_root("root", "Music");
        let sub = MemoryFolder::new("d1", "Albums");
        let nested = MemoryFolder::new("d2", "1969");

        let root_key = index.insert_folder(root, None);
        let sub_key = index.insert_folder(sub.clone(), Some(root_key));
        let nested_key = index.insert_folder(nested.clone(), Some(sub_key));
        index.record_file(sub_key, "f1");
        index.record_file(nested_key, "f2");

        let watch = nested.watch().await.unwrap().unwrap();
        index.attach_watch(nested_key, watch);

        let actions = reconcile(
            &mut index,
            root_key,
            FolderEvent::Removed(StorageEntry::Folder(sub)),
        );

        let removed: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                ReconcileAction::FileRemoved(id) => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert!(removed.contains(&"f1"));
        assert!(removed.contains(&"f2"));
        assert_eq!(
            actions
                .iter()
                .filter(|a| matches!(a, ReconcileAction::Unsubscribe(_)))
                .count(),
            1
        );
        assert_eq!(index.folder_count(), 1);
        assert!(index.key_of("d1").is_none());
        assert!(index.key_of("d2").is_none());
    }

    #[tokio::test]
    async fn test_event_for_unknown_folder_is_ignored() {
        let mut index = ScanIndex::new();
        let file = MemoryFile::new("f1", "a.mp3", vec![]);
        let actions = reconcile(
            &mut index,
            42,
            FolderEvent::Added(StorageEntry::File(file)),
        );
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn test_removed_unknown_child_is_ignored() {
        let mut index = ScanIndex::new();
        let root = MemoryFolder::new_root("root", "Music");
        let key = index.insert_folder(root, None);

        let stranger = MemoryFile::new("f9", "x.mp3", vec![]);
        let actions = reconcile(
            &mut index,
            key,
            FolderEvent::Removed(StorageEntry::File(stranger)),
        );
        assert!(actions.is_empty());
    }
}
