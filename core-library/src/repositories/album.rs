//! Album repository trait and in-memory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{LibraryError, Result};
use crate::models::AlbumMetadata;

/// Album repository interface for accumulation and lookup.
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// Find an album by its ID
    ///
    /// # Returns
    /// - `Ok(Some(album))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: &str) -> Result<Option<AlbumMetadata>>;

    /// Insert or merge an album.
    ///
    /// When an album with the same identifier exists, the incoming data is
    /// folded into it: already-populated fields are kept, relationship sets
    /// union. Adding the same track identifier twice is a no-op.
    ///
    /// # Errors
    /// Returns an error if the album carries no identifier.
    async fn upsert(&self, album: AlbumMetadata) -> Result<()>;

    /// All accumulated albums, in unspecified order.
    async fn list(&self) -> Result<Vec<AlbumMetadata>>;

    /// Count accumulated albums.
    async fn count(&self) -> Result<usize>;
}

/// In-memory implementation of [`AlbumRepository`].
#[derive(Default)]
pub struct InMemoryAlbumRepository {
    entries: RwLock<HashMap<String, AlbumMetadata>>,
}

impl InMemoryAlbumRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlbumRepository for InMemoryAlbumRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<AlbumMetadata>> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn upsert(&self, album: AlbumMetadata) -> Result<()> {
        let id = album
            .id
            .clone()
            .ok_or(LibraryError::MissingIdentifier {
                entity_type: "AlbumMetadata",
            })?;

        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(existing) => existing.merge_from(album),
            None => {
                entries.insert(id, album);
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AlbumMetadata>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::album_id;

    fn album(title: &str) -> AlbumMetadata {
        AlbumMetadata {
            id: Some(album_id(title)),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_requires_identifier() {
        let repo = InMemoryAlbumRepository::new();
        let result = repo.upsert(AlbumMetadata::default()).await;
        assert!(matches!(
            result,
            Err(LibraryError::MissingIdentifier { .. })
        ));
    }

    #[tokio::test]
    async fn test_upsert_merges_relationship_sets() {
        let repo = InMemoryAlbumRepository::new();

        let mut first = album("Abbey Road");
        first.track_ids.insert("t1".to_string());
        repo.upsert(first).await.unwrap();

        let mut second = album("Abbey Road");
        second.track_ids.insert("t2".to_string());
        repo.upsert(second).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let merged = repo
            .find_by_id(&album_id("Abbey Road"))
            .await
            .unwrap()
            .unwrap();
        assert!(merged.track_ids.contains("t1"));
        assert!(merged.track_ids.contains("t2"));
    }

    #[tokio::test]
    async fn test_upsert_never_overwrites_populated_fields() {
        let repo = InMemoryAlbumRepository::new();

        let mut first = album("Abbey Road");
        first.description = Some("original".to_string());
        repo.upsert(first).await.unwrap();

        let mut second = album("Abbey Road");
        second.description = Some("late arrival".to_string());
        repo.upsert(second).await.unwrap();

        let merged = repo
            .find_by_id(&album_id("Abbey Road"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(merged.description.as_deref(), Some("original"));
    }
}
