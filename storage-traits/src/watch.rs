//! Folder change notifications.
//!
//! Watching is modeled as an explicit event channel rather than callback
//! observers: a mutable folder hands out a [`WatchHandle`] carrying an mpsc
//! receiver of [`FolderEvent`]s. Backends deliver events from whatever task
//! they like; consumers drain the channel on their own schedule.

use tokio::sync::mpsc;

use crate::item::StorageEntry;

/// A change to the immediate children of a watched folder.
#[derive(Debug, Clone)]
pub enum FolderEvent {
    /// An item appeared in the folder
    Added(StorageEntry),
    /// An item disappeared from the folder
    Removed(StorageEntry),
}

/// A live subscription to one folder's change events.
///
/// The backend-side unsubscribe action runs exactly once: on the first of
/// either an explicit [`unsubscribe`](WatchHandle::unsubscribe) call or drop.
pub struct WatchHandle {
    receiver: Option<mpsc::Receiver<FolderEvent>>,
    on_unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchHandle {
    /// Create a handle from a backend event channel and unsubscribe action.
    pub fn new(
        receiver: mpsc::Receiver<FolderEvent>,
        on_unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver: Some(receiver),
            on_unsubscribe: Some(Box::new(on_unsubscribe)),
        }
    }

    /// Take the event receiver so it can be drained by a separate task.
    ///
    /// Can only be called once; subsequent calls return `None`.
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<FolderEvent>> {
        self.receiver.take()
    }

    /// End the subscription and release the backend-side watcher.
    pub fn unsubscribe(mut self) {
        if let Some(action) = self.on_unsubscribe.take() {
            action();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Some(action) = self.on_unsubscribe.take() {
            action();
        }
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("receiver_taken", &self.receiver.is_none())
            .finish()
    }
}
