//! In-memory file node.

use async_trait::async_trait;
use std::io::Cursor;
use std::sync::{Arc, Mutex, Weak};

use storage_traits::{
    FileStream, MusicProperties, Result, StorageFile, StorageFolder, StorageItem,
};

use crate::folder::MemoryFolder;

/// A file held entirely in memory.
pub struct MemoryFile {
    id: String,
    name: String,
    content: Vec<u8>,
    properties: Option<MusicProperties>,
    thumbnail: Option<Vec<u8>>,
    pub(crate) parent: Mutex<Weak<MemoryFolder>>,
}

impl MemoryFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, content: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            name: name.into(),
            content,
            properties: None,
            thumbnail: None,
            parent: Mutex::new(Weak::new()),
        })
    }

    /// Attach filesystem-exposed music properties.
    pub fn with_properties(
        id: impl Into<String>,
        name: impl Into<String>,
        content: Vec<u8>,
        properties: MusicProperties,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            name: name.into(),
            content,
            properties: Some(properties),
            thumbnail: None,
            parent: Mutex::new(Weak::new()),
        })
    }

    /// Attach both properties and a thumbnail payload.
    pub fn with_properties_and_thumbnail(
        id: impl Into<String>,
        name: impl Into<String>,
        content: Vec<u8>,
        properties: MusicProperties,
        thumbnail: Vec<u8>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            name: name.into(),
            content,
            properties: Some(properties),
            thumbnail: Some(thumbnail),
            parent: Mutex::new(Weak::new()),
        })
    }
}

impl StorageItem for MemoryFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl StorageFile for MemoryFile {
    async fn open_read(&self) -> Result<FileStream> {
        Ok(Box::new(Cursor::new(self.content.clone())))
    }

    async fn parent(&self) -> Result<Option<Arc<dyn StorageFolder>>> {
        let parent = self.parent.lock().expect("parent lock poisoned").upgrade();
        Ok(parent.map(|p| p as Arc<dyn StorageFolder>))
    }

    async fn music_properties(&self) -> Result<Option<MusicProperties>> {
        Ok(self.properties.clone())
    }

    async fn open_thumbnail(&self) -> Result<Option<FileStream>> {
        Ok(self
            .thumbnail
            .clone()
            .map(|bytes| Box::new(Cursor::new(bytes)) as FileStream))
    }
}
