//! Tag-embedded metadata extraction via `lofty`.

use lofty::config::ParseOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::MimeType;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use core_library::identity::embedded_image_id;
use core_library::{AlbumMetadata, ArtistMetadata, FileScanRecord, ImageMetadata, TrackMetadata};
use storage_traits::{StorageFile, StorageItem};

use crate::error::{MetadataError, Result};

/// Read a file's full contents through the storage stream.
pub(crate) async fn read_all(file: &Arc<dyn StorageFile>) -> Result<Vec<u8>> {
    let mut stream = file.open_read().await?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Extract a scan record from the file's embedded tag.
///
/// Returns `Ok(None)` when the file carries no tag or an empty one; that is
/// a non-match, not an error. Picture bytes are not copied out here, only
/// their index-qualified identifiers and MIME types.
pub(crate) async fn scan_tags(
    file: &Arc<dyn StorageFile>,
    parse_options: ParseOptions,
    cancel: &CancellationToken,
) -> Result<Option<FileScanRecord>> {
    if cancel.is_cancelled() {
        return Err(MetadataError::Cancelled);
    }
    let bytes = read_all(file).await?;
    if cancel.is_cancelled() {
        return Err(MetadataError::Cancelled);
    }

    let tagged_file = Probe::new(Cursor::new(&bytes))
        .options(parse_options)
        .guess_file_type()
        .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to probe file: {e}")))?
        .read()
        .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to parse file: {e}")))?;

    let tag = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        Some(tag) if !tag.is_empty() => tag,
        _ => {
            debug!(file = file.id(), "no usable tag");
            return Ok(None);
        }
    };

    let duration = tagged_file.properties().duration();
    let genres: std::collections::BTreeSet<String> = tag
        .get_strings(&ItemKey::Genre)
        .map(str::to_string)
        .collect();
    let comment = tag.comment().map(|s| s.to_string());

    let track = TrackMetadata {
        title: tag.title().map(|s| s.to_string()),
        track_number: tag.track(),
        disc_number: tag.disk(),
        duration: Some(duration),
        year: tag.year(),
        language: tag.get_string(&ItemKey::Language).map(str::to_string),
        lyrics: tag.get_string(&ItemKey::Lyrics).map(str::to_string),
        description: comment.clone(),
        genres: genres.clone(),
        ..Default::default()
    };

    let album = AlbumMetadata {
        title: tag.album().map(|s| s.to_string()),
        description: comment,
        date_published: tag
            .year()
            .and_then(|y| chrono::NaiveDate::from_ymd_opt(y as i32, 1, 1)),
        duration: Some(duration),
        genres,
        ..Default::default()
    };

    let mut album_artists: Vec<ArtistMetadata> = tag
        .get_strings(&ItemKey::AlbumArtist)
        .map(named_artist)
        .collect();
    let mut track_artists: Vec<ArtistMetadata> = tag
        .get_strings(&ItemKey::TrackArtist)
        .map(named_artist)
        .collect();
    ensure_album_artists(&mut album_artists, &mut track_artists);

    let images = tag
        .pictures()
        .iter()
        .enumerate()
        .map(|(index, pic)| ImageMetadata {
            id: embedded_image_id(file.id(), index),
            mime_type: pic.mime_type().map(mime_type_to_string),
        })
        .collect();

    Ok(Some(FileScanRecord {
        track,
        album,
        album_artists,
        track_artists,
        images,
    }))
}

pub(crate) fn named_artist(name: &str) -> ArtistMetadata {
    ArtistMetadata {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

/// Every track resolves to at least one album artist: synthesize an
/// empty-name placeholder when the source names none. Album artists are
/// implicitly track artists too, unless already present by name.
pub(crate) fn ensure_album_artists(
    album_artists: &mut Vec<ArtistMetadata>,
    track_artists: &mut Vec<ArtistMetadata>,
) {
    if album_artists.is_empty() {
        album_artists.push(named_artist(""));
    }
    for album_artist in album_artists.iter() {
        let present = track_artists
            .iter()
            .any(|artist| artist.name == album_artist.name);
        if !present {
            track_artists.push(album_artist.clone());
        }
    }
}

/// Decode the tag's nth embedded picture. Used by lazy image retrieval.
pub(crate) fn embedded_picture_bytes(bytes: &[u8], index: usize) -> Option<Vec<u8>> {
    let tagged_file = Probe::new(Cursor::new(bytes))
        .options(ParseOptions::new())
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let tag: &Tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag())?;
    tag.pictures().get(index).map(|pic| pic.data().to_vec())
}

/// Convert lofty MimeType to string
pub(crate) fn mime_type_to_string(mime_type: &MimeType) -> String {
    match mime_type {
        MimeType::Png => "image/png".to_string(),
        MimeType::Jpeg => "image/jpeg".to_string(),
        MimeType::Tiff => "image/tiff".to_string(),
        MimeType::Bmp => "image/bmp".to_string(),
        MimeType::Gif => "image/gif".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_synthesized_when_no_album_artist() {
        let mut album_artists = Vec::new();
        let mut track_artists = Vec::new();
        ensure_album_artists(&mut album_artists, &mut track_artists);

        assert_eq!(album_artists.len(), 1);
        assert_eq!(album_artists[0].name.as_deref(), Some(""));
        // The placeholder also lands in the track-artist list.
        assert_eq!(track_artists.len(), 1);
        assert_eq!(track_artists[0].name.as_deref(), Some(""));
    }

    #[test]
    fn test_album_artists_become_track_artists_unless_present() {
        let mut album_artists = vec![named_artist("The Beatles")];
        let mut track_artists = vec![named_artist("The Beatles"), named_artist("Billy Preston")];
        ensure_album_artists(&mut album_artists, &mut track_artists);

        // Already present by name: not duplicated.
        assert_eq!(track_artists.len(), 2);

        let mut album_artists = vec![named_artist("The Beatles")];
        let mut track_artists = vec![named_artist("Billy Preston")];
        ensure_album_artists(&mut album_artists, &mut track_artists);
        assert_eq!(track_artists.len(), 2);
        assert!(track_artists
            .iter()
            .any(|a| a.name.as_deref() == Some("The Beatles")));
    }

    #[test]
    fn test_mime_type_to_string() {
        assert_eq!(mime_type_to_string(&MimeType::Png), "image/png");
        assert_eq!(mime_type_to_string(&MimeType::Jpeg), "image/jpeg");
    }
}
