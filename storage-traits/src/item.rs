//! File and folder abstractions over the ingested storage tree.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::properties::MusicProperties;
use crate::watch::WatchHandle;

/// A readable byte stream opened from a storage backend.
pub type FileStream = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// Common surface of every item in a storage tree.
///
/// Identifiers are opaque strings assigned by the backend; they are unique
/// within one tree and stable for the item's lifetime. Names are the
/// user-visible leaf names (`"track.mp3"`, `"Albums"`).
pub trait StorageItem: Send + Sync {
    /// Backend-assigned stable identifier
    fn id(&self) -> &str;

    /// Leaf name, including any extension
    fn name(&self) -> &str;
}

/// A file in the storage tree.
///
/// # Example
///
/// ```ignore
/// use storage_traits::StorageFile;
/// use tokio::io::AsyncReadExt;
///
/// async fn read_all(file: &dyn StorageFile) -> storage_traits::Result<Vec<u8>> {
///     let mut stream = file.open_read().await?;
///     let mut buf = Vec::new();
///     stream.read_to_end(&mut buf).await?;
///     Ok(buf)
/// }
/// ```
#[async_trait]
pub trait StorageFile: StorageItem {
    /// Open the file for streaming reads.
    async fn open_read(&self) -> Result<FileStream>;

    /// Folder that contains this file.
    ///
    /// Returns `Ok(None)` when the backend cannot address upward from a file
    /// (e.g. a share link with no browsable parent).
    async fn parent(&self) -> Result<Option<Arc<dyn StorageFolder>>>;

    /// Music properties the backend exposes for this file, if any.
    ///
    /// These are filesystem-level properties (duration, track number,
    /// contributor name lists), not tag-embedded metadata.
    async fn music_properties(&self) -> Result<Option<MusicProperties>>;

    /// Open the backend-provided thumbnail for this file, if one exists.
    async fn open_thumbnail(&self) -> Result<Option<FileStream>>;

    /// Lower-cased extension without the dot, derived from [`StorageItem::name`].
    fn extension(&self) -> Option<String> {
        let name = self.name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// A folder in the storage tree.
#[async_trait]
pub trait StorageFolder: StorageItem {
    /// Enumerate the folder's immediate children.
    async fn children(&self) -> Result<Vec<StorageEntry>>;

    /// Parent folder, or `Ok(None)` at the root of the addressable tree.
    async fn parent(&self) -> Result<Option<Arc<dyn StorageFolder>>>;

    /// Subscribe to change notifications for this folder.
    ///
    /// Returns `Ok(None)` for backends or folders that cannot report
    /// mutations. Each returned [`WatchHandle`] must be balanced by exactly
    /// one unsubscribe (explicit or on drop).
    async fn watch(&self) -> Result<Option<WatchHandle>>;
}

/// A directory entry: either a file or a folder.
#[derive(Clone)]
pub enum StorageEntry {
    File(Arc<dyn StorageFile>),
    Folder(Arc<dyn StorageFolder>),
}

impl StorageEntry {
    pub fn id(&self) -> &str {
        match self {
            StorageEntry::File(f) => f.id(),
            StorageEntry::Folder(f) => f.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StorageEntry::File(f) => f.name(),
            StorageEntry::Folder(f) => f.name(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, StorageEntry::File(_))
    }
}

impl std::fmt::Debug for StorageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageEntry::File(file) => f
                .debug_struct("StorageEntry::File")
                .field("id", &file.id())
                .field("name", &file.name())
                .finish(),
            StorageEntry::Folder(folder) => f
                .debug_struct("StorageEntry::Folder")
                .field("id", &folder.id())
                .field("name", &folder.name())
                .finish(),
        }
    }
}
