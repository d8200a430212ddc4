//! Facade bundling all repositories behind one commit surface.

use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::models::{FileScanRecord, PlaylistMetadata};
use crate::repositories::{
    AlbumRepository, ArtistRepository, ImageRepository, InMemoryAlbumRepository,
    InMemoryArtistRepository, InMemoryImageRepository, InMemoryPlaylistRepository,
    InMemoryTrackRepository, PlaylistRepository, TrackRepository,
};

/// All accumulation repositories behind one handle.
///
/// `commit_record` is commutative and idempotent across files: every upsert
/// merges by identifier, so the order files are scanned in cannot change the
/// resulting graph.
#[derive(Clone)]
pub struct MetadataStore {
    pub tracks: Arc<dyn TrackRepository>,
    pub albums: Arc<dyn AlbumRepository>,
    pub artists: Arc<dyn ArtistRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub playlists: Arc<dyn PlaylistRepository>,
}

impl MetadataStore {
    /// A store backed entirely by in-memory repositories.
    pub fn in_memory() -> Self {
        Self {
            tracks: Arc::new(InMemoryTrackRepository::new()),
            albums: Arc::new(InMemoryAlbumRepository::new()),
            artists: Arc::new(InMemoryArtistRepository::new()),
            images: Arc::new(InMemoryImageRepository::new()),
            playlists: Arc::new(InMemoryPlaylistRepository::new()),
        }
    }

    /// Fold one finished scan record into the repositories.
    ///
    /// Requires identity assignment and cross-linking to have run; upserting
    /// entities without identifiers fails.
    pub async fn commit_record(&self, record: &FileScanRecord) -> Result<()> {
        debug!(track = ?record.track.id, "committing scan record");

        self.tracks.upsert(record.track.clone()).await?;
        self.albums.upsert(record.album.clone()).await?;
        for artist in record.album_artists.iter().chain(&record.track_artists) {
            self.artists.upsert(artist.clone()).await?;
        }
        for image in &record.images {
            self.images.upsert(image.clone()).await?;
        }
        Ok(())
    }

    /// Store one parsed playlist.
    pub async fn commit_playlist(&self, playlist: PlaylistMetadata) -> Result<()> {
        debug!(playlist = %playlist.id, tracks = playlist.total_tracks, "committing playlist");
        self.playlists.upsert(playlist).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{album_id, artist_id};
    use crate::models::{AlbumMetadata, ArtistMetadata, TrackMetadata};

    fn record(file_id: &str, album_title: &str) -> FileScanRecord {
        let artist = ArtistMetadata {
            id: Some(artist_id("The Beatles")),
            name: Some("The Beatles".to_string()),
            track_ids: [file_id.to_string()].into(),
            album_ids: [album_id(album_title)].into(),
            ..Default::default()
        };
        FileScanRecord {
            track: TrackMetadata {
                id: Some(file_id.to_string()),
                album_id: Some(album_id(album_title)),
                ..Default::default()
            },
            album: AlbumMetadata {
                id: Some(album_id(album_title)),
                title: Some(album_title.to_string()),
                track_ids: [file_id.to_string()].into(),
                ..Default::default()
            },
            album_artists: vec![artist.clone()],
            track_artists: vec![artist],
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_two_files_same_album_title_converge() {
        let store = MetadataStore::in_memory();

        store.commit_record(&record("t1", "Abbey Road")).await.unwrap();
        store.commit_record(&record("t2", "Abbey Road")).await.unwrap();

        assert_eq!(store.albums.count().await.unwrap(), 1);
        let album = store
            .albums
            .find_by_id(&album_id("Abbey Road"))
            .await
            .unwrap()
            .unwrap();
        assert!(album.track_ids.contains("t1"));
        assert!(album.track_ids.contains("t2"));

        assert_eq!(store.artists.count().await.unwrap(), 1);
        assert_eq!(store.tracks.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_commit_is_idempotent() {
        let store = MetadataStore::in_memory();
        let rec = record("t1", "Abbey Road");

        store.commit_record(&rec).await.unwrap();
        store.commit_record(&rec).await.unwrap();

        let album = store
            .albums
            .find_by_id(&album_id("Abbey Road"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(album.track_ids.len(), 1);
    }
}
