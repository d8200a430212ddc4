//! # Library Domain Model
//!
//! Domain models and accumulation repositories for the music-library
//! ingestion core.
//!
//! ## Overview
//!
//! This crate holds:
//! - The metadata models produced by scanning (track, album, artist, image,
//!   playlist) and the transient per-file [`FileScanRecord`](models::FileScanRecord)
//! - Deterministic, content-derived identity ([`identity`]): albums and
//!   artists hash to the same identifier wherever they are discovered
//! - The live [`KnownFiles`](known::KnownFiles) index shared between the
//!   folder scanner (writer) and the playlist dispatcher (reader)
//! - Append-only repositories ([`repositories`]) that accumulate entities by
//!   identifier; upserts merge, they never destructively overwrite

pub mod error;
pub mod identity;
pub mod known;
pub mod models;
pub mod repositories;

pub use error::{LibraryError, Result};
pub use known::KnownFiles;
pub use models::{
    AlbumMetadata, ArtistMetadata, FileScanRecord, ImageMetadata, PlaylistMetadata, TrackMetadata,
};
