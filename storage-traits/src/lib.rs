//! # Storage Collaborator Traits
//!
//! Platform abstraction traits for the storage tree the library core ingests.
//!
//! ## Overview
//!
//! This crate defines the contract between the ingestion core and whatever
//! actually holds the files (local disk, a cloud drive, an archive). The core
//! only ever consumes this surface; it never implements a backend itself.
//!
//! ## Traits
//!
//! ### Tree access
//! - [`StorageFile`](item::StorageFile) - Readable byte streams, parent lookup,
//!   filesystem-exposed music properties and thumbnails
//! - [`StorageFolder`](item::StorageFolder) - Child enumeration, parent lookup,
//!   change watching for mutable folders
//!
//! ### Change notifications
//! - [`FolderEvent`](watch::FolderEvent) - Add/remove events for one folder
//! - [`WatchHandle`](watch::WatchHandle) - A live subscription; every subscribe
//!   is balanced by exactly one unsubscribe
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` bounds to support safe concurrent usage
//! across async tasks. Implementations must ensure thread safety.

pub mod error;
pub mod item;
pub mod properties;
pub mod watch;

pub use error::{Result, StorageError};
pub use item::{FileStream, StorageEntry, StorageFile, StorageFolder, StorageItem};
pub use properties::MusicProperties;
pub use watch::{FolderEvent, WatchHandle};
