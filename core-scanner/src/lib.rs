//! # Folder Scanner
//!
//! Recursive discovery of a storage tree with live watch reconciliation.
//!
//! ## Overview
//!
//! - [`FolderScanner::scan`] walks a root folder depth-first and yields every
//!   discovered file through a lazy channel, registering folders in a
//!   [`ScanIndex`](index::ScanIndex) and populating the shared
//!   [`KnownFiles`](core_library::KnownFiles) index as it goes
//! - Folders that support change notifications are subscribed *before* their
//!   children are enumerated, so mutations racing the initial walk are not
//!   lost
//! - Notifications flow through one inbound channel per scanner;
//!   [`reconcile`](index::reconcile) is a pure function from (index, event)
//!   to side-effect actions, so the incremental logic is testable without a
//!   storage backend
//! - [`FolderScanner::shutdown`] releases every outstanding watch
//!   subscription, best-effort

pub mod error;
pub mod index;
pub mod scanner;

pub use error::{Result, ScannerError};
pub use index::{reconcile, FolderKey, ReconcileAction, ScanIndex};
pub use scanner::FolderScanner;
