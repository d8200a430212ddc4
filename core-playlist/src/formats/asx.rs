//! ASX playlists (Windows Media).
//!
//! XML with case-insensitive element names: the playlist `<title>` and
//! `<abstract>` are captured outside entries, and each `<entry><ref href>`
//! is a track reference, concatenated onto the most recent `<base href>`.

use quick_xml::events::{BytesStart, Event};
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
    Abstract,
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
    let mut in_entry = false;
    let mut base = String::new();
    let mut capture: Option<Capture> = None;

    loop {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.local_name().as_ref().to_ascii_lowercase().as_slice() {
                    b"entry" => in_entry = true,
                    b"title" if !in_entry => capture = Some(Capture::Title),
                    b"abstract" if !in_entry => capture = Some(Capture::Abstract),
                    b"base" => {
                        if let Some(href) = href_attribute(&e) {
                            base = href;
                        }
                    }
                    b"ref" if in_entry => {
                        if let Some(href) = href_attribute(&e) {
                            references.push(percent_decode(&format!("{base}{href}")));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                let Some(field) = capture else { continue };
                let Ok(text) = t.unescape() else { continue };
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match field {
                    Capture::Title => playlist.title = Some(text.to_string()),
                    Capture::Abstract => playlist.description = Some(text.to_string()),
                }
            }
            Ok(Event::End(e)) => {
                match e.local_name().as_ref().to_ascii_lowercase().as_slice() {
                    b"entry" => in_entry = false,
                    b"title" | b"abstract" => capture = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(file = file.id(), error = %e, "malformed ASX");
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

fn href_attribute(element: &BytesStart<'_>) -> Option<String> {
    element.attributes().flatten().find_map(|attr| {
        if attr.key.as_ref().eq_ignore_ascii_case(b"href") {
            attr.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}
