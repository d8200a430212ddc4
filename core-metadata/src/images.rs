//! On-demand image byte retrieval.
//!
//! Scanning records image identifiers only; the bytes behind an identifier
//! are fetched here when something actually wants to display them. The
//! identifier's suffix says where to look: a backend thumbnail stream, or
//! an indexed picture inside the file's tag.

use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::debug;

use core_library::identity::{parse_image_id, ImageSource};
use core_library::KnownFiles;
use storage_traits::StorageFile;

use crate::tag;

/// Fetch the bytes behind an image identifier.
///
/// Any failure along the way (unknown identifier, file no longer known,
/// unsupported file, I/O error) yields `None`; image display is best-effort
/// and never propagates scan-path errors.
pub async fn image_bytes(known_files: &KnownFiles, image_id: &str) -> Option<Bytes> {
    let source = parse_image_id(image_id)?;

    match source {
        ImageSource::Thumbnail { file_id } => {
            let file = known_files.get(&file_id).await?;
            let mut stream = match file.open_thumbnail().await {
                Ok(Some(stream)) => stream,
                Ok(None) => return None,
                Err(e) => {
                    debug!(image = image_id, error = %e, "thumbnail open failed");
                    return None;
                }
            };
            let mut buf = Vec::new();
            if let Err(e) = stream.read_to_end(&mut buf).await {
                debug!(image = image_id, error = %e, "thumbnail read failed");
                return None;
            }
            Some(Bytes::from(buf))
        }
        ImageSource::Embedded { file_id, index } => {
            let file = known_files.get(&file_id).await?;
            let bytes = match tag::read_all(&file).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(image = image_id, error = %e, "file re-read failed");
                    return None;
                }
            };
            tag::embedded_picture_bytes(&bytes, index).map(Bytes::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_memory::MemoryFile;
    use storage_traits::MusicProperties;

    #[tokio::test]
    async fn test_thumbnail_bytes_fetched_lazily() {
        let known = KnownFiles::new();
        known
            .insert(MemoryFile::with_properties_and_thumbnail(
                "f1",
                "a.mp3",
                vec![],
                MusicProperties::default(),
                vec![1, 2, 3],
            ))
            .await;

        let bytes = image_bytes(&known, "f1.FileThumbnail").await.unwrap();
        assert_eq!(bytes.as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_file_yields_none() {
        let known = KnownFiles::new();
        assert!(image_bytes(&known, "ghost.FileThumbnail").await.is_none());
    }

    #[tokio::test]
    async fn test_unmintable_identifier_yields_none() {
        let known = KnownFiles::new();
        assert!(image_bytes(&known, "not-an-image-id").await.is_none());
    }

    #[tokio::test]
    async fn test_embedded_picture_on_tagless_file_yields_none() {
        let known = KnownFiles::new();
        known
            .insert(MemoryFile::new("f1", "a.mp3", b"not audio".to_vec()))
            .await;
        assert!(image_bytes(&known, "f1.Id3.Image.0").await.is_none());
    }
}
