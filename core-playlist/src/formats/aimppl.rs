//! AIMPPL4 playlists (AIMP).
//!
//! A sectioned text format switched by literal header lines:
//! `#-----SUMMARY-----#` holds `key=value` pairs (`Name` is the title),
//! `#-----SETTINGS-----#` is ignored, `#-----CONTENT-----#` holds
//! pipe-delimited entries whose first field is the track reference.
//! Well-formed relative references are resolved concurrently, with the
//! playlist keeping content order.

use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use core_library::PlaylistMetadata;
use storage_traits::StorageFile;

use crate::error::{PlaylistError, Result};
use crate::playlist_shell;
use crate::resolve::Resolver;

const SUMMARY_HEADER: &str = "#-----SUMMARY-----#";
const SETTINGS_HEADER: &str = "#-----SETTINGS-----#";
const CONTENT_HEADER: &str = "#-----CONTENT-----#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Summary,
    Settings,
    Content,
}

pub(crate) async fn parse(
    file: &Arc<dyn StorageFile>,
    content: &str,
    resolver: &Resolver,
    cancel: &CancellationToken,
) -> Result<Option<PlaylistMetadata>> {
    let mut playlist = playlist_shell(file);
    let mut section = Section::Preamble;
    let mut references: Vec<String> = Vec::new();

    for line in content.lines() {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }

        let line = line.trim_start_matches('\u{feff}').trim();
        match line {
            "" => continue,
            SUMMARY_HEADER => {
                section = Section::Summary;
                continue;
            }
            SETTINGS_HEADER => {
                section = Section::Settings;
                continue;
            }
            CONTENT_HEADER => {
                section = Section::Content;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Summary => {
                if let Some((key, value)) = line.split_once('=') {
                    if key.trim() == "Name" {
                        playlist.title = Some(value.trim().to_string());
                    }
                }
            }
            Section::Content => {
                // Group header lines start with '-'; entries are
                // pipe-delimited with the reference first.
                if line.starts_with('-') {
                    continue;
                }
                let reference = line.split('|').next().unwrap_or(line).trim();
                if !reference.is_empty() {
                    references.push(reference.to_string());
                }
            }
            Section::Preamble | Section::Settings => {}
        }
    }

    let resolutions = join_all(
        references
            .iter()
            .map(|reference| resolver.resolve(reference, cancel)),
    )
    .await;

    if cancel.is_cancelled() {
        return Err(PlaylistError::Cancelled);
    }
    for track_id in resolutions.into_iter().flatten() {
        playlist.add_track(track_id);
    }

    Ok(Some(playlist))
}
