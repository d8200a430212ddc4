//! Integration tests for the folder scanner against the in-memory backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use core_library::KnownFiles;
use core_scanner::FolderScanner;
use storage_memory::{MemoryFile, MemoryFolder};
use tokio_util::sync::CancellationToken;

/// Poll until `cond` holds, failing after ~2 seconds.
async fn wait_until<F, Fut>(what: &str, mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if cond().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

/// root/
///   a.mp3
///   albums/
///     b.mp3
///     1969/
///       c.mp3
fn sample_tree() -> Arc<MemoryFolder> {
    let root = MemoryFolder::new_root("root", "Music");
    root.add_file(MemoryFile::new("fa", "a.mp3", vec![]));

    let albums = MemoryFolder::new("albums", "albums");
    root.add_folder(albums.clone());
    albums.add_file(MemoryFile::new("fb", "b.mp3", vec![]));

    let year = MemoryFolder::new("1969", "1969");
    albums.add_folder(year.clone());
    year.add_file(MemoryFile::new("fc", "c.mp3", vec![]));

    root
}

async fn drain(
    mut rx: tokio::sync::mpsc::Receiver<Arc<dyn storage_traits::StorageFile>>,
) -> Vec<String> {
    let mut ids = Vec::new();
    while let Some(file) = rx.recv().await {
        ids.push(storage_traits::StorageItem::id(file.as_ref()).to_string());
    }
    ids
}

#[tokio::test]
async fn test_scan_discovers_all_files() {
    let root = sample_tree();
    let scanner = FolderScanner::new(KnownFiles::new());

    let rx = scanner.scan(root.clone(), CancellationToken::new()).await;
    let mut ids = drain(rx).await;
    ids.sort();

    assert_eq!(ids, vec!["fa", "fb", "fc"]);
    assert_eq!(scanner.known_files().len().await, 3);
    assert_eq!(scanner.indexed_folders().await, 3);

    scanner.shutdown().await;
}

#[tokio::test]
async fn test_scan_is_restartable() {
    let root = sample_tree();
    let scanner = FolderScanner::new(KnownFiles::new());

    drain(scanner.scan(root.clone(), CancellationToken::new()).await).await;
    let second = drain(scanner.scan(root.clone(), CancellationToken::new()).await).await;

    assert_eq!(second.len(), 3);
    assert_eq!(scanner.known_files().len().await, 3);

    // Restarting must not stack extra watch subscriptions.
    scanner.shutdown().await;
    let stats = root.watch_stats();
    assert_eq!(stats.subscribed(), 3);
    assert_eq!(stats.live(), 0);
}

#[tokio::test]
async fn test_added_file_lands_in_known_files() {
    let root = sample_tree();
    let scanner = FolderScanner::new(KnownFiles::new());
    drain(scanner.scan(root.clone(), CancellationToken::new()).await).await;

    let albums = root.folder("albums").unwrap();
    albums.add_file(MemoryFile::new("fd", "d.mp3", vec![]));

    let known = scanner.known_files();
    wait_until("added file indexed", || {
        let known = known.clone();
        async move { known.contains("fd").await }
    })
    .await;

    scanner.shutdown().await;
}

#[tokio::test]
async fn test_added_folder_is_descended_and_watched() {
    let root = sample_tree();
    let scanner = FolderScanner::new(KnownFiles::new());
    drain(scanner.scan(root.clone(), CancellationToken::new()).await).await;

    // Build a small subtree offline, then attach it in one notification.
    let incoming = MemoryFolder::new("new", "new-albums");
    let nested = MemoryFolder::new("new-nested", "disc2");
    incoming.add_folder(nested.clone());
    nested.add_file(MemoryFile::new("fe", "e.mp3", vec![]));
    root.add_folder(incoming);

    let known = scanner.known_files();
    wait_until("nested file indexed", || {
        let known = known.clone();
        async move { known.contains("fe").await }
    })
    .await;
    assert_eq!(scanner.indexed_folders().await, 5);

    // Watchers were installed transitively for both new folders.
    scanner.shutdown().await;
    let stats = root.watch_stats();
    assert_eq!(stats.subscribed(), 5);
    assert_eq!(stats.live(), 0);
}

#[tokio::test]
async fn test_removed_folder_drops_nested_files_and_watchers() {
    let root = sample_tree();
    let scanner = FolderScanner::new(KnownFiles::new());
    drain(scanner.scan(root.clone(), CancellationToken::new()).await).await;

    root.remove("albums");

    let known = scanner.known_files();
    wait_until("subtree dropped", || {
        let known = known.clone();
        async move { !known.contains("fb").await && !known.contains("fc").await }
    })
    .await;

    // Root file survives; the subtree's two watchers were released.
    assert!(scanner.known_files().contains("fa").await);
    assert_eq!(scanner.indexed_folders().await, 1);

    let stats = root.watch_stats();
    wait_until("subtree watchers released", || {
        let stats = stats.clone();
        async move { stats.unsubscribed() == 2 }
    })
    .await;

    scanner.shutdown().await;
    assert_eq!(stats.subscribed(), 3);
    assert_eq!(stats.unsubscribed(), 3);
}

#[tokio::test]
async fn test_pre_cancelled_scan_yields_nothing() {
    let root = sample_tree();
    let scanner = FolderScanner::new(KnownFiles::new());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let ids = drain(scanner.scan(root.clone(), cancel).await).await;

    assert!(ids.is_empty());
    scanner.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_is_symmetric_for_all_watchers() {
    let root = sample_tree();
    let scanner = FolderScanner::new(KnownFiles::new());
    drain(scanner.scan(root.clone(), CancellationToken::new()).await).await;

    let stats = root.watch_stats();
    assert_eq!(stats.subscribed(), 3);
    assert_eq!(stats.live(), 3);

    scanner.shutdown().await;
    assert_eq!(stats.unsubscribed(), 3);
    assert_eq!(stats.live(), 0);
}

#[tokio::test]
async fn test_unwatchable_folders_still_scan() {
    let root = MemoryFolder::new_unwatchable("root", "Music");
    root.add_file(MemoryFile::new("fa", "a.mp3", vec![]));

    let scanner = FolderScanner::new(KnownFiles::new());
    let ids = drain(scanner.scan(root.clone(), CancellationToken::new()).await).await;

    assert_eq!(ids, vec!["fa"]);
    scanner.shutdown().await;
}
