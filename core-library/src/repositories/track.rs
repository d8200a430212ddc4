//! Track repository trait and in-memory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{LibraryError, Result};
use crate::models::TrackMetadata;

/// Track repository interface for accumulation and lookup.
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// Find a track by its ID (the owning file's identifier)
    async fn find_by_id(&self, id: &str) -> Result<Option<TrackMetadata>>;

    /// Insert or merge a track (rescans of the same file fold together).
    ///
    /// # Errors
    /// Returns an error if the track carries no identifier.
    async fn upsert(&self, track: TrackMetadata) -> Result<()>;

    /// All accumulated tracks, in unspecified order.
    async fn list(&self) -> Result<Vec<TrackMetadata>>;

    /// Count accumulated tracks.
    async fn count(&self) -> Result<usize>;
}

/// In-memory implementation of [`TrackRepository`].
#[derive(Default)]
pub struct InMemoryTrackRepository {
    entries: RwLock<HashMap<String, TrackMetadata>>,
}

impl InMemoryTrackRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackRepository for InMemoryTrackRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<TrackMetadata>> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn upsert(&self, track: TrackMetadata) -> Result<()> {
        let id = track
            .id
            .clone()
            .ok_or(LibraryError::MissingIdentifier {
                entity_type: "TrackMetadata",
            })?;

        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(existing) => existing.merge_from(track),
            None => {
                entries.insert(id, track);
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<TrackMetadata>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
