//! MPC-PL playlists (Media Player Classic).
//!
//! The literal first line `MPCPLAYLIST` is required; subsequent lines are
//! `<index>,<attribute>,<value>` triples. Only `filename` attributes
//! contribute track references.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use core_library::PlaylistMetadata;
use storage_traits::StorageFile;

use crate::error::{PlaylistError, Result};
use crate::playlist_shell;
use crate::resolve::Resolver;

const HEADER: &str = "MPCPLAYLIST";

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

    for line in lines {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }

        let mut parts = line.trim().splitn(3, ',');
        let (Some(index), Some(attribute), Some(value)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        if index.parse::<usize>().is_err() {
            continue;
        }
        if attribute != "filename" {
            continue;
        }
        if let Some(track_id) = resolver.resolve(value, cancel).await {
            playlist.add_track(track_id);
        }
    }

    Ok(Some(playlist))
}
