//! Playlist repository trait and in-memory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::PlaylistMetadata;

/// Playlist repository interface.
///
/// Unlike albums and artists, a playlist's source of truth is its file: a
/// re-parse replaces the stored entry outright instead of merging.
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Find a playlist by its ID (the playlist file's identifier)
    async fn find_by_id(&self, id: &str) -> Result<Option<PlaylistMetadata>>;

    /// Insert or replace a playlist.
    async fn upsert(&self, playlist: PlaylistMetadata) -> Result<()>;

    /// All accumulated playlists, in unspecified order.
    async fn list(&self) -> Result<Vec<PlaylistMetadata>>;

    /// Count accumulated playlists.
    async fn count(&self) -> Result<usize>;
}

/// In-memory implementation of [`PlaylistRepository`].
#[derive(Default)]
pub struct InMemoryPlaylistRepository {
    entries: RwLock<HashMap<String, PlaylistMetadata>>,
}

impl InMemoryPlaylistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaylistRepository for InMemoryPlaylistRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<PlaylistMetadata>> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn upsert(&self, playlist: PlaylistMetadata) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(playlist.id.clone(), playlist);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PlaylistMetadata>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
