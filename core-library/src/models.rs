//! Domain models for the music library
//!
//! These are the entities the ingestion pipeline produces. Relationship
//! fields are real sets so that cross-linking and repository merges stay
//! idempotent: adding the same identifier twice cannot duplicate it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Metadata for one music track.
///
/// Identity is the owning file's identifier, assigned during identity
/// assignment and stable for the file's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Unique identifier (the owning file's identifier)
    pub id: Option<String>,
    /// Track title; defaulted to the empty string, never left null
    pub title: Option<String>,
    /// Track position on album
    pub track_number: Option<u32>,
    /// Disc number for multi-disc albums
    pub disc_number: Option<u32>,
    /// Playback duration
    pub duration: Option<Duration>,
    /// Release year
    pub year: Option<u32>,
    /// ISO language code of the lyrics
    pub language: Option<String>,
    /// Unsynchronized lyrics text
    pub lyrics: Option<String>,
    /// Free-form description (tag comment)
    pub description: Option<String>,
    /// Genre names
    pub genres: BTreeSet<String>,
    /// Identifiers of every artist credited on this track
    pub artist_ids: BTreeSet<String>,
    /// Identifiers of every image scanned for the owning file
    pub image_ids: BTreeSet<String>,
    /// Identifier of the owning album
    pub album_id: Option<String>,
}

/// Metadata for one album.
///
/// Albums are append-only accumulators: identity is a content hash of the
/// title, so files discovered independently converge on one instance whose
/// relationship sets only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    /// Unique identifier (hash of `title + "_album"`)
    pub id: Option<String>,
    /// Album title; defaulted to the empty string, never left null
    pub title: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Publish date (widened from the tag's release year)
    pub date_published: Option<NaiveDate>,
    /// Total playback duration
    pub duration: Option<Duration>,
    /// Genre names
    pub genres: BTreeSet<String>,
    /// Identifiers of the album's artists
    pub artist_ids: BTreeSet<String>,
    /// Identifiers of the album's tracks
    pub track_ids: BTreeSet<String>,
    /// Identifiers of the album's images
    pub image_ids: BTreeSet<String>,
}

/// Metadata for one artist.
///
/// Same convergence property as albums: identity is a content hash of the
/// name, so "Abbey Road"'s artist discovered from two files is one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistMetadata {
    /// Unique identifier (hash of `name + "_artist"`)
    pub id: Option<String>,
    /// Artist name; defaulted to the empty string, never left null
    pub name: Option<String>,
    /// External URL for the artist
    pub url: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Identifier of the artist's image
    pub image_id: Option<String>,
    /// Genre names
    pub genres: BTreeSet<String>,
    /// Identifiers of albums this artist appears on
    pub album_ids: BTreeSet<String>,
    /// Identifiers of tracks this artist is credited on
    pub track_ids: BTreeSet<String>,
}

/// Metadata for one image, disambiguated by source.
///
/// Identifiers encode where the bytes come from so retrieval can be lazy:
/// `"<fileId>.FileThumbnail"` for a backend thumbnail,
/// `"<fileId>.Id3.Image.<n>"` for the nth embedded picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Source-qualified identifier
    pub id: String,
    /// MIME type, when the source reports one
    pub mime_type: Option<String>,
}

/// Metadata for one playlist file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistMetadata {
    /// The playlist file's identifier
    pub id: String,
    /// Playlist title; falls back to the filename when the format has none
    pub title: Option<String>,
    /// Free-form description, for formats that carry one
    pub description: Option<String>,
    /// External URL, for formats that carry one
    pub url: Option<String>,
    /// Resolved track identifiers in playlist order, deduplicated
    pub track_ids: Vec<String>,
    /// Count of admitted tracks
    pub total_tracks: usize,
}

impl PlaylistMetadata {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Append a resolved track, keeping first-seen order and dropping
    /// duplicates. Returns whether the track was admitted.
    pub fn add_track(&mut self, track_id: impl Into<String>) -> bool {
        let track_id = track_id.into();
        if self.track_ids.contains(&track_id) {
            return false;
        }
        self.track_ids.push(track_id);
        self.total_tracks += 1;
        true
    }
}

fn fill<T>(dst: &mut Option<T>, src: Option<T>) {
    if dst.is_none() {
        *dst = src;
    }
}

impl TrackMetadata {
    /// Fold another instance into this one: populated fields win, absent
    /// fields are filled, relationship sets union.
    pub fn merge_from(&mut self, other: TrackMetadata) {
        fill(&mut self.id, other.id);
        fill(&mut self.title, other.title);
        fill(&mut self.track_number, other.track_number);
        fill(&mut self.disc_number, other.disc_number);
        fill(&mut self.duration, other.duration);
        fill(&mut self.year, other.year);
        fill(&mut self.language, other.language);
        fill(&mut self.lyrics, other.lyrics);
        fill(&mut self.description, other.description);
        fill(&mut self.album_id, other.album_id);
        self.genres.extend(other.genres);
        self.artist_ids.extend(other.artist_ids);
        self.image_ids.extend(other.image_ids);
    }
}

impl AlbumMetadata {
    /// Fold another instance into this one: populated fields win, absent
    /// fields are filled, relationship sets union.
    pub fn merge_from(&mut self, other: AlbumMetadata) {
        fill(&mut self.id, other.id);
        fill(&mut self.title, other.title);
        fill(&mut self.description, other.description);
        fill(&mut self.date_published, other.date_published);
        fill(&mut self.duration, other.duration);
        self.genres.extend(other.genres);
        self.artist_ids.extend(other.artist_ids);
        self.track_ids.extend(other.track_ids);
        self.image_ids.extend(other.image_ids);
    }
}

impl ArtistMetadata {
    /// Fold another instance into this one: populated fields win, absent
    /// fields are filled, relationship sets union.
    pub fn merge_from(&mut self, other: ArtistMetadata) {
        fill(&mut self.id, other.id);
        fill(&mut self.name, other.name);
        fill(&mut self.url, other.url);
        fill(&mut self.description, other.description);
        fill(&mut self.image_id, other.image_id);
        self.genres.extend(other.genres);
        self.album_ids.extend(other.album_ids);
        self.track_ids.extend(other.track_ids);
    }
}

/// Transient result of scanning one physical file.
///
/// Produced by the extractor, folded by the merger, consumed by the
/// repositories, then discarded. The artist lists are non-empty by the time
/// extraction completes: a placeholder artist with an empty name is
/// synthesized when the source names none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileScanRecord {
    pub track: TrackMetadata,
    pub album: AlbumMetadata,
    /// Album artists, in source order; never empty after extraction
    pub album_artists: Vec<ArtistMetadata>,
    /// Track artists, in source order; never empty after extraction
    pub track_artists: Vec<ArtistMetadata>,
    /// Every image discovered for the file
    pub images: Vec<ImageMetadata>,
}
