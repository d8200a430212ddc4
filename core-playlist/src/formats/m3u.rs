//! M3U / M3U8 / VLC playlists.
//!
//! Line-oriented: `#PLAYLIST:` sets the title, other `#`-prefixed lines are
//! directives we ignore, everything else is a track reference in file order.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use core_library::PlaylistMetadata;
use storage_traits::StorageFile;

use crate::error::{PlaylistError, Result};
use crate::playlist_shell;
use crate::resolve::Resolver;

const TITLE_DIRECTIVE: &str = "#PLAYLIST:";

pub(crate) async fn parse(
    file: &Arc<dyn StorageFile>,
    content: &str,
    resolver: &Resolver,
    cancel: &CancellationToken,
) -> Result<Option<PlaylistMetadata>> {
    let mut playlist = playlist_shell(file);

    for line in content.lines() {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(title) = line.strip_prefix(TITLE_DIRECTIVE) {
            playlist.title = Some(title.trim().to_string());
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if let Some(track_id) = resolver.resolve(line, cancel).await {
            playlist.add_track(track_id);
        }
    }

    Ok(Some(playlist))
}
