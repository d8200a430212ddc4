//! Artist repository trait and in-memory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{LibraryError, Result};
use crate::models::ArtistMetadata;

/// Artist repository interface for accumulation and lookup.
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Find an artist by its ID
    async fn find_by_id(&self, id: &str) -> Result<Option<ArtistMetadata>>;

    /// Insert or merge an artist (same merge discipline as albums).
    ///
    /// # Errors
    /// Returns an error if the artist carries no identifier.
    async fn upsert(&self, artist: ArtistMetadata) -> Result<()>;

    /// All accumulated artists, in unspecified order.
    async fn list(&self) -> Result<Vec<ArtistMetadata>>;

    /// Count accumulated artists.
    async fn count(&self) -> Result<usize>;
}

/// In-memory implementation of [`ArtistRepository`].
#[derive(Default)]
pub struct InMemoryArtistRepository {
    entries: RwLock<HashMap<String, ArtistMetadata>>,
}

impl InMemoryArtistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtistRepository for InMemoryArtistRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<ArtistMetadata>> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn upsert(&self, artist: ArtistMetadata) -> Result<()> {
        let id = artist
            .id
            .clone()
            .ok_or(LibraryError::MissingIdentifier {
                entity_type: "ArtistMetadata",
            })?;

        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(existing) => existing.merge_from(artist),
            None => {
                entries.insert(id, artist);
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ArtistMetadata>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
