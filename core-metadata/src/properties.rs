//! Extraction from filesystem-exposed music properties.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use core_library::identity::thumbnail_image_id;
use core_library::{AlbumMetadata, ArtistMetadata, FileScanRecord, ImageMetadata, TrackMetadata};
use storage_traits::{StorageFile, StorageItem};

use crate::error::{MetadataError, Result};
use crate::tag::{ensure_album_artists, named_artist};

/// Extract a scan record from the backend's music properties.
///
/// Returns `Ok(None)` when the backend exposes no properties for the file.
/// A thumbnail, if present, is recorded by identifier only; its stream is
/// closed as soon as existence is established.
pub(crate) async fn scan_properties(
    file: &Arc<dyn StorageFile>,
    cancel: &CancellationToken,
) -> Result<Option<FileScanRecord>> {
    if cancel.is_cancelled() {
        return Err(MetadataError::Cancelled);
    }

    let props = match file.music_properties().await? {
        Some(props) if !props.is_empty() => props,
        _ => {
            debug!(file = file.id(), "no music properties");
            return Ok(None);
        }
    };

    let track = TrackMetadata {
        title: props.title.clone(),
        track_number: props.track_number,
        duration: props.duration,
        year: props.year,
        genres: props.genres.iter().cloned().collect(),
        ..Default::default()
    };

    let album = AlbumMetadata {
        title: props.album.clone(),
        duration: props.duration,
        date_published: props
            .year
            .and_then(|y| chrono::NaiveDate::from_ymd_opt(y as i32, 1, 1)),
        genres: props.genres.iter().cloned().collect(),
        ..Default::default()
    };

    let mut album_artists: Vec<ArtistMetadata> = props
        .album_artist
        .as_deref()
        .map(named_artist)
        .into_iter()
        .collect();

    // Contributor name lists all fold into the track-artist list.
    let mut track_artists: Vec<ArtistMetadata> = Vec::new();
    for name in props
        .composers
        .iter()
        .chain(&props.conductors)
        .chain(&props.producers)
        .chain(&props.writers)
    {
        if !track_artists
            .iter()
            .any(|artist| artist.name.as_deref() == Some(name.as_str()))
        {
            track_artists.push(named_artist(name));
        }
    }
    ensure_album_artists(&mut album_artists, &mut track_artists);

    let mut images = Vec::new();
    match file.open_thumbnail().await {
        Ok(Some(stream)) => {
            // Existence is all we need now; bytes are fetched lazily later.
            drop(stream);
            images.push(ImageMetadata {
                id: thumbnail_image_id(file.id()),
                mime_type: None,
            });
        }
        Ok(None) => {}
        Err(e) => warn!(file = file.id(), error = %e, "thumbnail probe failed"),
    }

    Ok(Some(FileScanRecord {
        track,
        album,
        album_artists,
        track_artists,
        images,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_memory::MemoryFile;
    use storage_traits::MusicProperties;

    fn props() -> MusicProperties {
        MusicProperties {
            title: Some("Come Together".to_string()),
            album: Some("Abbey Road".to_string()),
            album_artist: Some("The Beatles".to_string()),
            track_number: Some(1),
            year: Some(1969),
            genres: vec!["Rock".to_string()],
            composers: vec!["Lennon".to_string(), "McCartney".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_properties_record_shape() {
        let file: Arc<dyn StorageFile> =
            MemoryFile::with_properties("f1", "come-together.mp3", vec![], props());
        let record = scan_properties(&file, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.track.title.as_deref(), Some("Come Together"));
        assert_eq!(record.album.title.as_deref(), Some("Abbey Road"));
        assert_eq!(record.album_artists.len(), 1);
        // Composers fold into track artists, then the album artist joins them.
        assert_eq!(record.track_artists.len(), 3);
        assert!(record.images.is_empty());
    }

    #[tokio::test]
    async fn test_no_properties_yields_none() {
        let file: Arc<dyn StorageFile> = MemoryFile::new("f1", "untagged.mp3", vec![]);
        let result = scan_properties(&file, &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_thumbnail_recorded_by_identifier() {
        let file: Arc<dyn StorageFile> = MemoryFile::with_properties_and_thumbnail(
            "f1",
            "come-together.mp3",
            vec![],
            props(),
            vec![0xFF, 0xD8],
        );
        let record = scan_properties(&file, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.images.len(), 1);
        assert_eq!(record.images[0].id, "f1.FileThumbnail");
    }

    #[tokio::test]
    async fn test_cancellation_propagates() {
        let file: Arc<dyn StorageFile> =
            MemoryFile::with_properties("f1", "a.mp3", vec![], props());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = scan_properties(&file, &cancel).await;
        assert!(matches!(result, Err(MetadataError::Cancelled)));
    }
}
