//! Cross-linking the track/album/artist/image graph.

use std::collections::BTreeSet;

use core_library::FileScanRecord;

/// Establish the bidirectional identifier sets that make the metadata graph
/// navigable from any entity:
///
/// - the album gains the track's identifier and every image identifier
///   scanned for the file, and its album artists' identifiers
/// - every album artist gains this track's and album's identifiers
/// - every track artist gains this album's and track's identifiers, and the
///   track gains every (album + track) artist's identifier
/// - the track's image set is recomputed as the union of all scanned images
///
/// Idempotent: relationship containers are sets, so running this twice
/// cannot duplicate anything.
///
/// # Panics
///
/// Panics when any entity lacks an identifier: identity assignment must run
/// first, and a missing identifier is a pipeline-ordering bug.
pub fn cross_link(record: &mut FileScanRecord) {
    let track_id = record
        .track
        .id
        .clone()
        .expect("identity assignment must run before cross-linking (track)");
    let album_id = record
        .album
        .id
        .clone()
        .expect("identity assignment must run before cross-linking (album)");

    let image_ids: BTreeSet<String> = record.images.iter().map(|img| img.id.clone()).collect();

    record.album.track_ids.insert(track_id.clone());
    record.album.image_ids.extend(image_ids.iter().cloned());
    record.track.album_id = Some(album_id.clone());

    for artist in &mut record.album_artists {
        let artist_id = artist
            .id
            .clone()
            .expect("identity assignment must run before cross-linking (album artist)");
        artist.track_ids.insert(track_id.clone());
        artist.album_ids.insert(album_id.clone());
        record.album.artist_ids.insert(artist_id.clone());
        record.track.artist_ids.insert(artist_id);
    }

    for artist in &mut record.track_artists {
        let artist_id = artist
            .id
            .clone()
            .expect("identity assignment must run before cross-linking (track artist)");
        artist.track_ids.insert(track_id.clone());
        artist.album_ids.insert(album_id.clone());
        record.track.artist_ids.insert(artist_id);
    }

    record.track.image_ids = image_ids;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::assign_ids;
    use core_library::{ArtistMetadata, ImageMetadata};

    fn linked_record() -> FileScanRecord {
        let artist = ArtistMetadata {
            name: Some("The Beatles".to_string()),
            ..Default::default()
        };
        let mut record = FileScanRecord {
            album_artists: vec![artist.clone()],
            track_artists: vec![artist],
            ..Default::default()
        };
        record.album.title = Some("Abbey Road".to_string());
        record.images.push(ImageMetadata {
            id: "f1.Id3.Image.0".to_string(),
            mime_type: Some("image/jpeg".to_string()),
        });
        assign_ids("f1", &mut record);
        cross_link(&mut record);
        record
    }

    #[test]
    fn test_graph_is_bidirectional() {
        let record = linked_record();
        let track_id = record.track.id.as_deref().unwrap();
        let album_id = record.album.id.as_deref().unwrap();
        let artist_id = record.album_artists[0].id.as_deref().unwrap();

        assert!(record.album.track_ids.contains(track_id));
        assert!(record.album.image_ids.contains("f1.Id3.Image.0"));
        assert!(record.album.artist_ids.contains(artist_id));
        assert_eq!(record.track.album_id.as_deref(), Some(album_id));
        assert!(record.track.artist_ids.contains(artist_id));
        assert!(record.track.image_ids.contains("f1.Id3.Image.0"));
        assert!(record.album_artists[0].track_ids.contains(track_id));
        assert!(record.album_artists[0].album_ids.contains(album_id));
        assert!(record.track_artists[0].track_ids.contains(track_id));
    }

    #[test]
    fn test_cross_link_is_idempotent() {
        let mut record = linked_record();
        let snapshot = record.clone();

        cross_link(&mut record);
        assert_eq!(record, snapshot);
    }

    #[test]
    #[should_panic(expected = "identity assignment must run before cross-linking")]
    fn test_unassigned_record_panics() {
        let mut record = FileScanRecord::default();
        cross_link(&mut record);
    }
}
