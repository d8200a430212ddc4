//! Relative reference resolution against the storage tree.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use core_library::KnownFiles;
use storage_traits::{StorageEntry, StorageFile, StorageFolder, StorageItem};

/// Resolves relative references found inside a playlist against the tree
/// around the playlist file, admitting only files present in the shared
/// known-files index.
pub struct Resolver {
    origin: Option<Arc<dyn StorageFolder>>,
    known: KnownFiles,
}

impl Resolver {
    /// Build a resolver anchored at the playlist file's folder.
    pub async fn new(playlist_file: &Arc<dyn StorageFile>, known: &KnownFiles) -> Self {
        let origin = playlist_file.parent().await.ok().flatten();
        Self {
            origin,
            known: known.clone(),
        }
    }

    /// Resolve one reference to a known file's identifier.
    ///
    /// Walks the tree one segment at a time from the playlist's folder:
    /// `..` ascends (requiring the backend to support parent lookup), any
    /// other segment descends into a child by name, case-insensitively.
    /// Malformed references, missing intermediate items, non-addressable
    /// parents and targets absent from the known-files index all yield
    /// `None` silently; a broken reference never aborts the parse.
    pub async fn resolve(&self, raw: &str, cancel: &CancellationToken) -> Option<String> {
        let path = raw.trim();
        if !is_relative_reference(path) {
            trace!(reference = path, "not a well-formed relative reference");
            return None;
        }

        let normalized = path.replace('\\', "/");
        let segments: Vec<&str> = normalized
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let (&file_name, dirs) = segments.split_last()?;
        if file_name == ".." {
            return None;
        }

        let mut folder = self.origin.clone()?;
        for &dir in dirs {
            if cancel.is_cancelled() {
                return None;
            }
            if dir == ".." {
                folder = folder.parent().await.ok()??;
                continue;
            }
            folder = child_folder(&folder, dir).await?;
        }

        let target = child_file(&folder, file_name).await?;
        if self.known.contains(target.id()).await {
            Some(target.id().to_string())
        } else {
            trace!(reference = path, "target not in known-files index");
            None
        }
    }
}

/// A reference is relative when it has no scheme, no root, and no drive.
fn is_relative_reference(path: &str) -> bool {
    if path.is_empty() || path.contains("://") {
        return false;
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return false;
    }
    // Windows drive prefix, e.g. `C:\Music`
    let bytes = path.as_bytes();
    !(bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic())
}

async fn child_folder(
    folder: &Arc<dyn StorageFolder>,
    name: &str,
) -> Option<Arc<dyn StorageFolder>> {
    folder.children().await.ok()?.into_iter().find_map(|entry| match entry {
        StorageEntry::Folder(f) if f.name().eq_ignore_ascii_case(name) => Some(f),
        _ => None,
    })
}

async fn child_file(folder: &Arc<dyn StorageFolder>, name: &str) -> Option<Arc<dyn StorageFile>> {
    folder.children().await.ok()?.into_iter().find_map(|entry| match entry {
        StorageEntry::File(f) if f.name().eq_ignore_ascii_case(name) => Some(f),
        _ => None,
    })
}

/// Decode `%XX` escapes in URI-style references (XSPF/ASX locations).
pub(crate) fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = &input[i + 1..i + 3];
            if let Ok(value) = u8::from_str_radix(hex, 16) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
