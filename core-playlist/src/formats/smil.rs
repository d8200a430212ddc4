//! SMIL-family playlists: `.zpl`, `.wpl`, `.smil` (Zune/Windows Media).
//!
//! XML: `<head><title>` is the playlist title; every `<media src>` inside
//! the body is a track reference. A `media` element without a `src`
//! attribute is skipped on its own; later entries still parse.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use core_library::PlaylistMetadata;
use storage_traits::{StorageFile, StorageItem};

use crate::error::{PlaylistError, Result};
use crate::playlist_shell;
use crate::resolve::Resolver;

pub(crate) async fn parse(
    file: &Arc<dyn StorageFile>,
    content: &str,
    resolver: &Resolver,
    cancel: &CancellationToken,
) -> Result<Option<PlaylistMetadata>> {
    let mut playlist = playlist_shell(file);
    let mut references: Vec<String> = Vec::new();

    let mut reader = Reader::from_str(content);
    let mut in_title = false;

    loop {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.local_name().as_ref().to_ascii_lowercase().as_slice() {
                    b"title" => in_title = true,
                    b"media" => match src_attribute(&e) {
                        Some(src) => references.push(src),
                        // No source path: skip this entry only.
                        None => continue,
                    },
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if !in_title {
                    continue;
                }
                if let Ok(text) = t.unescape() {
                    let text = text.trim();
                    if !text.is_empty() {
                        playlist.title = Some(text.to_string());
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref().eq_ignore_ascii_case(b"title") {
                    in_title = false;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(file = file.id(), error = %e, "malformed SMIL playlist");
                break;
            }
        }
    }

    for reference in references {
        if let Some(track_id) = resolver.resolve(&reference, cancel).await {
            playlist.add_track(track_id);
        }
    }

    Ok(Some(playlist))
}

fn src_attribute(element: &BytesStart<'_>) -> Option<String> {
    element.attributes().flatten().find_map(|attr| {
        if attr.key.as_ref().eq_ignore_ascii_case(b"src") {
            attr.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}
