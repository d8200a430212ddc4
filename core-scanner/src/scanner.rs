//! Recursive folder discovery with live watch reconciliation.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use core_library::KnownFiles;
use storage_traits::{FolderEvent, StorageEntry, StorageFile, StorageFolder, StorageItem};

use crate::error::{Result, ScannerError};
use crate::index::{reconcile, FolderKey, ReconcileAction, ScanIndex};

/// Capacity of the lazy discovery channel; the walk pauses when the
/// consumer stops pulling.
const DISCOVERY_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the scanner's single inbound notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Walks storage trees depth-first and keeps the discovered file/folder
/// indices current as watched folders change underneath it.
///
/// One reconciliation task per scanner serializes every index mutation;
/// watch notifications are forwarded into it by lightweight pump tasks, so
/// backend callbacks never block.
pub struct FolderScanner {
    inner: Arc<ScannerInner>,
}

struct ScannerInner {
    known_files: KnownFiles,
    index: Mutex<ScanIndex>,
    lifetime: CancellationToken,
    events_tx: mpsc::Sender<(FolderKey, FolderEvent)>,
}

impl FolderScanner {
    /// Create a scanner writing discoveries into the given known-files index.
    pub fn new(known_files: KnownFiles) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let inner = Arc::new(ScannerInner {
            known_files,
            index: Mutex::new(ScanIndex::new()),
            lifetime: CancellationToken::new(),
            events_tx,
        });

        tokio::spawn(reconciliation_loop(Arc::clone(&inner), events_rx));
        Self { inner }
    }

    /// The shared known-files index this scanner maintains.
    pub fn known_files(&self) -> KnownFiles {
        self.inner.known_files.clone()
    }

    /// Number of folders currently registered in the index.
    pub async fn indexed_folders(&self) -> usize {
        self.inner.index.lock().await.folder_count()
    }

    /// Walk `root` depth-first, yielding every discovered file lazily.
    ///
    /// Folders supporting notifications are subscribed before their children
    /// are enumerated. The walk can be restarted by calling `scan` again;
    /// already-registered folders keep their single watch subscription.
    /// Cancelling aborts the walk without corrupting what was already
    /// indexed.
    pub async fn scan(
        &self,
        root: Arc<dyn StorageFolder>,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<Arc<dyn StorageFile>> {
        let (files_tx, files_rx) = mpsc::channel(DISCOVERY_CHANNEL_CAPACITY);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            info!(root = root.id(), "starting folder scan");
            let key = register_folder(&inner, root.clone(), None).await;
            match visit_folder(inner, key, root, Some(files_tx), cancel).await {
                Ok(()) => debug!("folder scan complete"),
                Err(ScannerError::Cancelled) => debug!("folder scan cancelled"),
                Err(e) => warn!(error = %e, "folder scan aborted"),
            }
        });

        files_rx
    }

    /// Tear down every outstanding watch subscription, best-effort, and stop
    /// the reconciliation loop.
    pub async fn shutdown(&self) {
        self.inner.lifetime.cancel();
        let watches = self.inner.index.lock().await.take_all_watches();
        debug!(count = watches.len(), "releasing watch subscriptions");
        for watch in watches {
            watch.unsubscribe();
        }
    }
}

/// Insert a folder into the index and subscribe to its notifications.
///
/// Subscription happens before the caller enumerates children so changes
/// racing the initial walk are caught by the watch. A folder that is
/// already registered keeps its existing subscription.
async fn register_folder(
    inner: &Arc<ScannerInner>,
    folder: Arc<dyn StorageFolder>,
    parent: Option<FolderKey>,
) -> FolderKey {
    let (key, already_watched) = {
        let mut index = inner.index.lock().await;
        let key = index.insert_folder(folder.clone(), parent);
        let watched = index.node(key).map(|n| n.watch.is_some()).unwrap_or(false);
        (key, watched)
    };

    if !already_watched {
        subscribe_watch(inner, key, &folder).await;
    }
    key
}

async fn subscribe_watch(inner: &Arc<ScannerInner>, key: FolderKey, folder: &Arc<dyn StorageFolder>) {
    match folder.watch().await {
        Ok(Some(mut handle)) => {
            if let Some(receiver) = handle.take_receiver() {
                tokio::spawn(pump_events(
                    inner.events_tx.clone(),
                    key,
                    receiver,
                    inner.lifetime.clone(),
                ));
            }
            inner.index.lock().await.attach_watch(key, handle);
            debug!(folder = folder.id(), "watch subscribed");
        }
        Ok(None) => {}
        Err(e) => warn!(folder = folder.id(), error = %e, "watch subscription failed"),
    }
}

/// Forward one folder's events into the scanner's inbound channel.
async fn pump_events(
    events_tx: mpsc::Sender<(FolderKey, FolderEvent)>,
    key: FolderKey,
    mut receiver: mpsc::Receiver<FolderEvent>,
    lifetime: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = lifetime.cancelled() => break,
            event = receiver.recv() => match event {
                Some(event) => {
                    if events_tx.send((key, event)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}

/// Depth-first visit: record the folder's known children, then emit files
/// and recurse into subfolders.
fn visit_folder(
    inner: Arc<ScannerInner>,
    key: FolderKey,
    folder: Arc<dyn StorageFolder>,
    files_tx: Option<mpsc::Sender<Arc<dyn StorageFile>>>,
    cancel: CancellationToken,
) -> BoxFuture<'static, Result<()>> {
    async move {
        if cancel.is_cancelled() || inner.lifetime.is_cancelled() {
            return Err(ScannerError::Cancelled);
        }

        let children = folder.children().await?;

        {
            let mut index = inner.index.lock().await;
            for child in &children {
                if let StorageEntry::File(file) = child {
                    index.record_file(key, file.id());
                }
            }
        }

        for child in children {
            if cancel.is_cancelled() || inner.lifetime.is_cancelled() {
                return Err(ScannerError::Cancelled);
            }
            match child {
                StorageEntry::File(file) => {
                    inner.known_files.insert(file.clone()).await;
                    if let Some(tx) = &files_tx {
                        if tx.send(file).await.is_err() {
                            // Consumer went away; stop walking.
                            return Err(ScannerError::Cancelled);
                        }
                    }
                }
                StorageEntry::Folder(subfolder) => {
                    let child_key =
                        register_folder(&inner, subfolder.clone(), Some(key)).await;
                    match visit_folder(
                        Arc::clone(&inner),
                        child_key,
                        subfolder,
                        files_tx.clone(),
                        cancel.clone(),
                    )
                    .await
                    {
                        Ok(()) => {}
                        Err(ScannerError::Cancelled) => return Err(ScannerError::Cancelled),
                        Err(e) => warn!(error = %e, "skipping unreadable folder"),
                    }
                }
            }
        }
        Ok(())
    }
    .boxed()
}

/// Single-writer loop applying folder events to the index.
async fn reconciliation_loop(
    inner: Arc<ScannerInner>,
    mut events_rx: mpsc::Receiver<(FolderKey, FolderEvent)>,
) {
    loop {
        let (key, event) = tokio::select! {
            _ = inner.lifetime.cancelled() => break,
            received = events_rx.recv() => match received {
                Some(pair) => pair,
                None => break,
            },
        };

        let actions = reconcile(&mut *inner.index.lock().await, key, event);
        apply_actions(&inner, actions).await;
    }
}

async fn apply_actions(inner: &Arc<ScannerInner>, actions: Vec<ReconcileAction>) {
    for action in actions {
        match action {
            ReconcileAction::FileAdded(file) => {
                debug!(file = file.id(), "file added by notification");
                inner.known_files.insert(file).await;
            }
            ReconcileAction::FileRemoved(id) => {
                debug!(file = %id, "file removed by notification");
                inner.known_files.remove(&id).await;
            }
            ReconcileAction::Unsubscribe(watch) => watch.unsubscribe(),
            ReconcileAction::Descend { key, folder } => {
                // A folder appeared under a watched parent: install its
                // watcher and index its subtree, transitively.
                subscribe_watch(inner, key, &folder).await;
                match visit_folder(
                    Arc::clone(inner),
                    key,
                    folder,
                    None,
                    inner.lifetime.child_token(),
                )
                .await
                {
                    Ok(()) | Err(ScannerError::Cancelled) => {}
                    Err(e) => warn!(error = %e, "descent into added folder failed"),
                }
            }
        }
    }
}
