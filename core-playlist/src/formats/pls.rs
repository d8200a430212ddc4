//! PLS playlists.
//!
//! INI-style: the literal `[playlist]` header is required; `File<N>=` keys
//! carry track references. `NumberOfEntries` is parsed but not enforced.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use core_library::PlaylistMetadata;
use storage_traits::StorageFile;

use crate::error::{PlaylistError, Result};
use crate::playlist_shell;
use crate::resolve::Resolver;

const HEADER: &str = "[playlist]";

pub(crate) async fn parse(
    file: &Arc<dyn StorageFile>,
    content: &str,
    resolver: &Resolver,
    cancel: &CancellationToken,
) -> Result<Option<PlaylistMetadata>> {
    let mut lines = content.lines();
    match lines.next().map(str::trim) {
        Some(first) if first == HEADER => {}
        _ => return Ok(None),
    }

    let mut playlist = playlist_shell(file);
    let mut declared_entries: Option<usize> = None;

    for line in lines {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }

        let line = line.trim();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key == "NumberOfEntries" {
            declared_entries = value.parse().ok();
            continue;
        }
        if is_file_key(key) {
            if let Some(track_id) = resolver.resolve(value, cancel).await {
                playlist.add_track(track_id);
            }
        }
    }

    if let Some(declared) = declared_entries {
        if declared != playlist.total_tracks {
            debug!(
                declared,
                resolved = playlist.total_tracks,
                "NumberOfEntries does not match resolved tracks"
            );
        }
    }

    Ok(Some(playlist))
}

/// `File<N>` with a numeric suffix.
fn is_file_key(key: &str) -> bool {
    key.strip_prefix("File")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
