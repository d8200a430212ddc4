//! Deterministic identity assignment.

use core_library::identity;
use core_library::FileScanRecord;

/// Assign every missing identifier in the record.
///
/// Track identity is the owning file's identifier. Album and artist
/// identities are content hashes of their display text, so independently
/// scanned files describing the same album or artist converge. Empty titles
/// and names become the empty string, never null; downstream display layers
/// substitute a localized placeholder.
///
/// # Panics
///
/// Panics when the artist lists are empty: extraction must have synthesized
/// at least a placeholder artist, so an empty list is a pipeline-ordering
/// bug, not bad input.
pub fn assign_ids(file_id: &str, record: &mut FileScanRecord) {
    assert!(
        !record.album_artists.is_empty(),
        "album-artist list must be populated before identity assignment"
    );
    assert!(
        !record.track_artists.is_empty(),
        "track-artist list must be populated before identity assignment"
    );

    record.track.id = Some(file_id.to_string());
    if record.track.title.is_none() {
        record.track.title = Some(String::new());
    }

    let album_title = record
        .album
        .title
        .get_or_insert_with(String::new)
        .clone();
    record.album.id = Some(identity::album_id(&album_title));

    for artist in record
        .album_artists
        .iter_mut()
        .chain(record.track_artists.iter_mut())
    {
        let name = artist.name.get_or_insert_with(String::new).clone();
        artist.id = Some(identity::artist_id(&name));
    }
}
