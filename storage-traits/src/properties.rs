//! Filesystem-exposed music properties.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Music properties a storage backend exposes for a file, independent of any
/// embedded tag. Desktop filesystems surface these from the shell property
/// store; cloud backends may synthesize them server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicProperties {
    /// Track title
    pub title: Option<String>,
    /// Album title
    pub album: Option<String>,
    /// Album artist name
    pub album_artist: Option<String>,
    /// Playback duration
    pub duration: Option<Duration>,
    /// Track position on album
    pub track_number: Option<u32>,
    /// Release year
    pub year: Option<u32>,
    /// Genre names
    pub genres: Vec<String>,
    /// Composer names
    pub composers: Vec<String>,
    /// Conductor names
    pub conductors: Vec<String>,
    /// Producer names
    pub producers: Vec<String>,
    /// Writer names
    pub writers: Vec<String>,
}

impl MusicProperties {
    /// True when no field carries any information.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.album.is_none()
            && self.album_artist.is_none()
            && self.duration.is_none()
            && self.track_number.is_none()
            && self.year.is_none()
            && self.genres.is_empty()
            && self.composers.is_empty()
            && self.conductors.is_empty()
            && self.producers.is_empty()
            && self.writers.is_empty()
    }
}
