//! Image repository trait and in-memory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::ImageMetadata;

/// Image repository interface for accumulation and lookup.
///
/// Only metadata is stored; image bytes are fetched lazily by identifier
/// from the owning file when something actually displays them.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Find an image by its source-qualified ID
    async fn find_by_id(&self, id: &str) -> Result<Option<ImageMetadata>>;

    /// Insert or refresh an image record. The MIME type is filled if it was
    /// previously unknown.
    async fn upsert(&self, image: ImageMetadata) -> Result<()>;

    /// Count accumulated images.
    async fn count(&self) -> Result<usize>;
}

/// In-memory implementation of [`ImageRepository`].
#[derive(Default)]
pub struct InMemoryImageRepository {
    entries: RwLock<HashMap<String, ImageMetadata>>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<ImageMetadata>> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn upsert(&self, image: ImageMetadata) -> Result<()> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&image.id) {
            Some(existing) => {
                if existing.mime_type.is_none() {
                    existing.mime_type = image.mime_type;
                }
            }
            None => {
                entries.insert(image.id.clone(), image);
            }
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
