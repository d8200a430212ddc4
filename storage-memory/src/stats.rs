//! Watch subscription accounting.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-tree counters for watch subscriptions.
///
/// Shared by every folder in one tree. Tests assert symmetry: after a
/// scanner shuts down, `subscribed()` must equal `unsubscribed()`.
#[derive(Debug, Default)]
pub struct WatchStats {
    subscribed: AtomicUsize,
    unsubscribed: AtomicUsize,
}

impl WatchStats {
    pub(crate) fn record_subscribe(&self) {
        self.subscribed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_unsubscribe(&self) {
        self.unsubscribed.fetch_add(1, Ordering::SeqCst);
    }

    /// Total subscriptions handed out across the tree.
    pub fn subscribed(&self) -> usize {
        self.subscribed.load(Ordering::SeqCst)
    }

    /// Total subscriptions released across the tree.
    pub fn unsubscribed(&self) -> usize {
        self.unsubscribed.load(Ordering::SeqCst)
    }

    /// Subscriptions currently live.
    pub fn live(&self) -> usize {
        self.subscribed() - self.unsubscribed()
    }
}
