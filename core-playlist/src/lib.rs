//! # Playlist Parser Dispatcher
//!
//! Routes playlist files to format-specific parsers and resolves the track
//! references they contain against the scanner's known-files index.
//!
//! ## Formats
//!
//! | Parser | Extensions | Shape |
//! |--------|------------|-------|
//! | SMIL   | `.zpl` `.wpl` `.smil` | XML, `media@src` |
//! | M3U    | `.m3u` `.m3u8` `.vlc` | line-oriented |
//! | XSPF   | `.xspf` | XML, `track/location` |
//! | ASX    | `.asx` | XML, `entry/ref@href` with base concatenation |
//! | MPC-PL | `.mpcpl` | line-oriented, `index,attribute,value` |
//! | FPL    | `.fpl` | proprietary binary |
//! | PLS    | `.pls` | INI-style `File<N>=` keys |
//! | AIMPPL | `.aimppl4` | sectioned, pipe-delimited |
//!
//! Any other extension yields `Ok(None)` immediately. Broken references
//! inside a playlist are dropped silently; the playlist still parses.

pub mod error;
pub mod formats;
pub mod resolve;

pub use error::{PlaylistError, Result};
pub use resolve::Resolver;

use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use core_library::{KnownFiles, PlaylistMetadata};
use storage_traits::{StorageFile, StorageItem};

/// The playlist format a file extension dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaylistFormat {
    Smil,
    M3u,
    Xspf,
    Asx,
    Mpcpl,
    Fpl,
    Pls,
    Aimppl,
}

impl PlaylistFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "zpl" | "wpl" | "smil" => Some(Self::Smil),
            "m3u" | "m3u8" | "vlc" => Some(Self::M3u),
            "xspf" => Some(Self::Xspf),
            "asx" => Some(Self::Asx),
            "mpcpl" => Some(Self::Mpcpl),
            "fpl" => Some(Self::Fpl),
            "pls" => Some(Self::Pls),
            "aimppl4" => Some(Self::Aimppl),
            _ => None,
        }
    }
}

/// Parse one playlist file, dispatched purely by extension.
///
/// # Returns
///
/// - `Ok(Some(metadata))` with the resolved track identifiers
/// - `Ok(None)` for unsupported extensions, format mismatches (e.g. a bad
///   FPL magic number) and unreadable files
///
/// # Errors
///
/// Only cancellation is surfaced as an error.
pub async fn parse_playlist(
    file: &Arc<dyn StorageFile>,
    known_files: &KnownFiles,
    cancel: &CancellationToken,
) -> Result<Option<PlaylistMetadata>> {
    let Some(format) = file.extension().as_deref().and_then(PlaylistFormat::from_extension)
    else {
        return Ok(None);
    };

    if cancel.is_cancelled() {
        return Err(PlaylistError::Cancelled);
    }

    let bytes = match read_all(file).await {
        Ok(bytes) => bytes,
        Err(PlaylistError::Cancelled) => return Err(PlaylistError::Cancelled),
        Err(e) => {
            warn!(file = file.id(), error = %e, "playlist unreadable");
            return Ok(None);
        }
    };

    let resolver = Resolver::new(file, known_files).await;
    debug!(file = file.id(), format = ?format, "parsing playlist");

    match format {
        PlaylistFormat::Fpl => formats::fpl::parse(file, &bytes, &resolver, cancel).await,
        _ => {
            let content = String::from_utf8_lossy(&bytes);
            match format {
                PlaylistFormat::Smil => {
                    formats::smil::parse(file, &content, &resolver, cancel).await
                }
                PlaylistFormat::M3u => formats::m3u::parse(file, &content, &resolver, cancel).await,
                PlaylistFormat::Xspf => {
                    formats::xspf::parse(file, &content, &resolver, cancel).await
                }
                PlaylistFormat::Asx => formats::asx::parse(file, &content, &resolver, cancel).await,
                PlaylistFormat::Mpcpl => {
                    formats::mpcpl::parse(file, &content, &resolver, cancel).await
                }
                PlaylistFormat::Pls => formats::pls::parse(file, &content, &resolver, cancel).await,
                PlaylistFormat::Aimppl => {
                    formats::aimppl::parse(file, &content, &resolver, cancel).await
                }
                PlaylistFormat::Fpl => unreachable!("handled above"),
            }
        }
    }
}

async fn read_all(file: &Arc<dyn StorageFile>) -> Result<Vec<u8>> {
    let mut stream = file.open_read().await?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// A fresh playlist shell whose title falls back to the file's name.
pub(crate) fn playlist_shell(file: &Arc<dyn StorageFile>) -> PlaylistMetadata {
    PlaylistMetadata::new(file.id(), file.name())
}
