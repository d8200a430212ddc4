//! Deterministic, content-derived identity.
//!
//! Albums and artists get identifiers hashed from their display text plus a
//! per-entity suffix. Two files tagged with the same album title therefore
//! converge on one album identity even though they were discovered
//! independently, while the suffix keeps album and artist namespaces
//! disjoint even for identical text.

use md5::{Digest, Md5};

/// Namespace suffix for album identifiers.
pub const ALBUM_SUFFIX: &str = "_album";

/// Namespace suffix for artist identifiers.
pub const ARTIST_SUFFIX: &str = "_artist";

/// Identifier suffix marking a backend-provided thumbnail image.
pub const FILE_THUMBNAIL_SUFFIX: &str = ".FileThumbnail";

/// Identifier marker for the nth tag-embedded picture.
pub const EMBEDDED_IMAGE_MARKER: &str = ".Id3.Image.";

/// Stable hash of `name + suffix`, as lowercase hex.
pub fn resource_id(name: &str, suffix: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(name.as_bytes());
    hasher.update(suffix.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identifier for an album with the given title.
pub fn album_id(title: &str) -> String {
    resource_id(title, ALBUM_SUFFIX)
}

/// Identifier for an artist with the given name.
pub fn artist_id(name: &str) -> String {
    resource_id(name, ARTIST_SUFFIX)
}

/// Identifier for a file's backend thumbnail image.
pub fn thumbnail_image_id(file_id: &str) -> String {
    format!("{file_id}{FILE_THUMBNAIL_SUFFIX}")
}

/// Identifier for the nth picture embedded in a file's tag.
pub fn embedded_image_id(file_id: &str, index: usize) -> String {
    format!("{file_id}{EMBEDDED_IMAGE_MARKER}{index}")
}

/// The source an image identifier points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Backend thumbnail of the named file
    Thumbnail { file_id: String },
    /// nth embedded picture in the named file's tag
    Embedded { file_id: String, index: usize },
}

/// Decode an image identifier back into its source.
///
/// Returns `None` for identifiers this library did not mint.
pub fn parse_image_id(image_id: &str) -> Option<ImageSource> {
    if let Some(file_id) = image_id.strip_suffix(FILE_THUMBNAIL_SUFFIX) {
        if file_id.is_empty() {
            return None;
        }
        return Some(ImageSource::Thumbnail {
            file_id: file_id.to_string(),
        });
    }

    let marker_at = image_id.find(EMBEDDED_IMAGE_MARKER)?;
    let file_id = &image_id[..marker_at];
    let index = image_id[marker_at + EMBEDDED_IMAGE_MARKER.len()..]
        .parse::<usize>()
        .ok()?;
    if file_id.is_empty() {
        return None;
    }
    Some(ImageSource::Embedded {
        file_id: file_id.to_string(),
        index,
    })
}
