//! Folding multiple scan records for one file into a single record.

use core_library::FileScanRecord;

/// Fill every listed absent field of `$dst` from `$src`, first present wins.
macro_rules! fill_absent {
    ($dst:expr, $src:expr; $($field:ident),+ $(,)?) => {
        $(
            if $dst.$field.is_none() {
                $dst.$field = $src.$field.take();
            }
        )+
    };
}

/// Merge all records scanned for one file.
///
/// The first record is primary; every later record only fills fields the
/// primary lacks, never overwriting populated ones. Images are unioned by
/// identifier. Album artists fill positionally.
///
/// # Panics
///
/// Panics on an empty input: the caller only merges after at least one
/// extraction method produced a record.
pub fn merge(records: Vec<FileScanRecord>) -> FileScanRecord {
    let mut iter = records.into_iter();
    let mut primary = iter
        .next()
        .expect("merge requires at least one scan record");

    for record in iter {
        merge_into(&mut primary, record);
    }
    primary
}

fn merge_into(primary: &mut FileScanRecord, mut other: FileScanRecord) {
    fill_absent!(primary.track, other.track;
        id, title, track_number, disc_number, duration, year,
        language, lyrics, description,
    );
    if primary.track.genres.is_empty() {
        primary.track.genres = std::mem::take(&mut other.track.genres);
    }

    fill_absent!(primary.album, other.album;
        title, description, date_published, duration,
    );
    if primary.album.genres.is_empty() {
        primary.album.genres = std::mem::take(&mut other.album.genres);
    }

    // Album artists pair up positionally; extras in the other record are
    // appended so no source artist is lost.
    let primary_len = primary.album_artists.len();
    for (index, mut artist) in other.album_artists.drain(..).enumerate() {
        if index < primary_len {
            let target = &mut primary.album_artists[index];
            fill_absent!(target, artist; name, url);
        } else {
            primary.album_artists.push(artist);
        }
    }

    for image in other.images {
        if !primary.images.iter().any(|existing| existing.id == image.id) {
            primary.images.push(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::{ArtistMetadata, ImageMetadata, TrackMetadata};

    fn record_with_title(title: &str) -> FileScanRecord {
        FileScanRecord {
            track: TrackMetadata {
                title: Some(title.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_single_record_returned_unchanged() {
        let record = record_with_title("Come Together");
        let merged = merge(vec![record.clone()]);
        assert_eq!(merged, record);
    }

    #[test]
    fn test_populated_primary_field_never_overwritten() {
        let primary = record_with_title("Come Together");
        let secondary = record_with_title("Wrong Title");

        let merged = merge(vec![primary, secondary]);
        assert_eq!(merged.track.title.as_deref(), Some("Come Together"));
    }

    #[test]
    fn test_absent_fields_filled_from_secondary() {
        let mut primary = record_with_title("Come Together");
        primary.track.year = None;

        let mut secondary = FileScanRecord::default();
        secondary.track.year = Some(1969);
        secondary.track.track_number = Some(1);
        secondary.album.title = Some("Abbey Road".to_string());

        let merged = merge(vec![primary, secondary]);
        assert_eq!(merged.track.year, Some(1969));
        assert_eq!(merged.track.track_number, Some(1));
        assert_eq!(merged.album.title.as_deref(), Some("Abbey Road"));
    }

    #[test]
    fn test_images_unioned_by_identifier() {
        let mut primary = FileScanRecord::default();
        primary.images.push(ImageMetadata {
            id: "f1.Id3.Image.0".to_string(),
            mime_type: None,
        });

        let mut secondary = FileScanRecord::default();
        secondary.images.push(ImageMetadata {
            id: "f1.Id3.Image.0".to_string(),
            mime_type: None,
        });
        secondary.images.push(ImageMetadata {
            id: "f1.FileThumbnail".to_string(),
            mime_type: None,
        });

        let merged = merge(vec![primary, secondary]);
        assert_eq!(merged.images.len(), 2);
    }

    #[test]
    fn test_album_artists_fill_positionally() {
        let mut primary = FileScanRecord::default();
        primary.album_artists.push(ArtistMetadata {
            name: Some("The Beatles".to_string()),
            ..Default::default()
        });

        let mut secondary = FileScanRecord::default();
        secondary.album_artists.push(ArtistMetadata {
            name: Some("Ignored".to_string()),
            url: Some("https://example.test/beatles".to_string()),
            ..Default::default()
        });

        let merged = merge(vec![primary, secondary]);
        assert_eq!(merged.album_artists.len(), 1);
        assert_eq!(merged.album_artists[0].name.as_deref(), Some("The Beatles"));
        assert_eq!(
            merged.album_artists[0].url.as_deref(),
            Some("https://example.test/beatles")
        );
    }

    #[test]
    #[should_panic(expected = "at least one scan record")]
    fn test_empty_merge_panics() {
        merge(Vec::new());
    }
}
