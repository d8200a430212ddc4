//! # Tag & Property Metadata Extraction
//!
//! Extracts metadata from audio files and builds the cross-linked
//! track/album/artist/image graph, one file at a time.
//!
//! ## Overview
//!
//! - Tag-embedded metadata is decoded with the `lofty` crate; filesystem
//!   music properties come from the storage collaborator
//! - Each extraction method independently yields an optional
//!   [`FileScanRecord`](core_library::FileScanRecord); multiple records for
//!   one file are merged field-by-field with fill-if-absent semantics
//! - Identity assignment hashes album/artist display text into
//!   deterministic identifiers; cross-linking then wires the bidirectional
//!   relationship sets
//! - Image bytes are never read during a scan: embedded pictures and
//!   thumbnails are fetched lazily by identifier
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::{MusicFileScanner, ScanMode};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(file: std::sync::Arc<dyn storage_traits::StorageFile>) {
//! let scanner = MusicFileScanner::new();
//! let record = scanner
//!     .scan_music_file(&file, ScanMode::ALL, &CancellationToken::new())
//!     .await;
//! # }
//! ```

pub mod assign;
pub mod error;
pub mod images;
pub mod link;
pub mod merge;
pub mod properties;
pub mod scanner;
pub mod tag;

pub use error::{MetadataError, Result};
pub use images::image_bytes;
pub use scanner::{MusicFileScanner, ScanMode};
