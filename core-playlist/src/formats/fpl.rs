//! FPL playlists (foobar2000), a proprietary binary format.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! [0..16)  magic
//! u32      metadata block size
//! [..]     metadata block: null-terminated UTF-8 strings, addressed by
//!          byte offset
//! u32      track count
//! per track:
//!   u32    flags
//!   u32    filename offset into the metadata block
//!   u32    subsong index
//!   flags & HAS_STATS:
//!     u32  file size
//!     u64  file modification time
//!     f64  duration (seconds)
//!     f32  replay-gain album gain
//!     f32  replay-gain track gain
//!     f32  replay-gain album peak
//!     f32  replay-gain track peak
//!   flags & HAS_KEYS:
//!     u32  primary key count
//!     u32  secondary key count
//!     u32  tertiary key count
//!     (u32, u32) pairs for each of the three key tables, in order
//! ```
//!
//! A file whose first 16 bytes are not the magic is rejected with `None`.
//! Truncated data ends the track table early; references read so far are
//! kept. An empty primary-key table is legal and simply carries no
//! per-track metadata.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use core_library::PlaylistMetadata;
use storage_traits::{StorageFile, StorageItem};

use crate::error::{PlaylistError, Result};
use crate::playlist_shell;
use crate::resolve::Resolver;

/// Fixed signature at the start of every FPL file.
pub(crate) const MAGIC: [u8; 16] = [
    0xE1, 0xA0, 0x9C, 0x91, 0xF8, 0x3C, 0x77, 0x42, 0x85, 0x2C, 0x3B, 0xCC, 0x14, 0x01, 0xD3,
    0xF2,
];

const HAS_STATS: u32 = 0x01;
const HAS_KEYS: u32 = 0x04;

pub(crate) async fn parse(
    file: &Arc<dyn StorageFile>,
    bytes: &[u8],
    resolver: &Resolver,
    cancel: &CancellationToken,
) -> Result<Option<PlaylistMetadata>> {
    let mut reader = LeReader::new(bytes);

    match reader.take(MAGIC.len()) {
        Some(header) if header == MAGIC.as_slice() => {}
        _ => {
            debug!(file = file.id(), "missing FPL magic");
            return Ok(None);
        }
    }

    let Some(meta_size) = reader.read_u32() else {
        return Ok(None);
    };
    let Some(meta) = reader.take(meta_size as usize) else {
        return Ok(None);
    };
    let meta = meta.to_vec();

    let mut playlist = playlist_shell(file);
    let track_count = reader.read_u32().unwrap_or(0);

    for _ in 0..track_count {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }
        let Some(track) = read_track(&mut reader) else {
            debug!(file = file.id(), "truncated FPL track table");
            break;
        };

        let Some(path) = meta_string(&meta, track.file_name_offset as usize) else {
            continue;
        };
        let path = path.strip_prefix("file://").unwrap_or(&path).to_string();
        if let Some(track_id) = resolver.resolve(&path, cancel).await {
            playlist.add_track(track_id);
        }
    }

    Ok(Some(playlist))
}

struct FplTrack {
    file_name_offset: u32,
}

fn read_track(reader: &mut LeReader<'_>) -> Option<FplTrack> {
    let flags = reader.read_u32()?;
    let file_name_offset = reader.read_u32()?;
    let _subsong_index = reader.read_u32()?;

    if flags & HAS_STATS != 0 {
        let _file_size = reader.read_u32()?;
        let _file_time = reader.read_u64()?;
        let _duration = reader.read_f64()?;
        let _rpg_album = reader.read_f32()?;
        let _rpg_track = reader.read_f32()?;
        let _rpk_album = reader.read_f32()?;
        let _rpk_track = reader.read_f32()?;
    }

    if flags & HAS_KEYS != 0 {
        let primary = reader.read_u32()?;
        let secondary = reader.read_u32()?;
        let tertiary = reader.read_u32()?;
        // Key/value offset pairs; the track reference does not depend on
        // them, and an empty primary table is skipped rather than an error.
        let pair_count = primary.checked_add(secondary)?.checked_add(tertiary)?;
        for _ in 0..pair_count {
            reader.read_u32()?;
            reader.read_u32()?;
        }
    }

    Some(FplTrack { file_name_offset })
}

/// Null-terminated string at `offset` in the metadata block.
fn meta_string(meta: &[u8], offset: usize) -> Option<String> {
    if offset >= meta.len() {
        return None;
    }
    let rest = &meta[offset..];
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    Some(String::from_utf8_lossy(&rest[..end]).into_owned())
}

/// Little-endian cursor over a byte slice.
struct LeReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> LeReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        if end > self.buf.len() {
            return None;
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Some(slice)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take(4).map(|b| u32::from_le_bytes(b.try_into().unwrap()))
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take(8).map(|b| u64::from_le_bytes(b.try_into().unwrap()))
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.take(4).map(|b| f32::from_le_bytes(b.try_into().unwrap()))
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take(8).map(|b| f64::from_le_bytes(b.try_into().unwrap()))
    }
}
