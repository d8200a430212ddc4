//! # In-Memory Storage Backend
//!
//! A complete implementation of the `storage-traits` surface over an
//! in-memory tree. Intended for tests and demos: folders are mutable and
//! watchable, files carry byte content plus optional music properties and
//! thumbnails, and a per-tree [`WatchStats`] counter pair lets tests assert
//! that every watcher subscription is balanced by exactly one unsubscribe.
//!
//! ## Example
//!
//! ```ignore
//! use storage_memory::{MemoryFile, MemoryFolder};
//!
//! let root = MemoryFolder::new_root("root", "Music");
//! let album = MemoryFolder::new("d1", "Abbey Road");
//! root.add_folder(album.clone());
//! album.add_file(MemoryFile::new("t1", "Come Together.mp3", vec![]));
//! ```

mod file;
mod folder;
mod stats;

pub use file::MemoryFile;
pub use folder::MemoryFolder;
pub use stats::WatchStats;
