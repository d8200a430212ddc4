//! XSPF playlists.
//!
//! XML: the playlist-level `<title>` and `<annotation>` are captured, and
//! every `<track><location>` inside `<trackList>` is a track reference
//! (URI-style, so percent escapes are decoded).

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use core_library::PlaylistMetadata;
use storage_traits::{StorageFile, StorageItem};

use crate::error::{PlaylistError, Result};
use crate::playlist_shell;
use crate::resolve::{percent_decode, Resolver};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Capture {
    Title,
    Annotation,
    Location,
}

pub(crate) async fn parse(
    file: &Arc<dyn StorageFile>,
    content: &str,
    resolver: &Resolver,
    cancel: &CancellationToken,
) -> Result<Option<PlaylistMetadata>> {
    let mut playlist = playlist_shell(file);
    let mut references: Vec<String> = Vec::new();

    let mut reader = Reader::from_str(content);
    let mut in_tracklist = false;
    let mut capture: Option<Capture> = None;

    loop {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trackList" => in_tracklist = true,
                b"title" if !in_tracklist => capture = Some(Capture::Title),
                b"annotation" if !in_tracklist => capture = Some(Capture::Annotation),
                b"location" if in_tracklist => capture = Some(Capture::Location),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let Some(field) = capture else { continue };
                let Ok(text) = t.unescape() else { continue };
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match field {
                    Capture::Title => playlist.title = Some(text.to_string()),
                    Capture::Annotation => playlist.description = Some(text.to_string()),
                    Capture::Location => {
                        let location = text.strip_prefix("file://").unwrap_or(text);
                        references.push(percent_decode(location));
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"trackList" => in_tracklist = false,
                b"title" | b"annotation" | b"location" => capture = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                // Keep whatever parsed cleanly before the malformed spot.
                debug!(file = file.id(), error = %e, "malformed XSPF");
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
