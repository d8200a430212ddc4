//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-ingest`, `core-metadata`, `core-playlist`).
//! Host applications can depend on `mlc-workspace` and enable the documented
//! features without needing to wire each crate individually.

#[cfg(feature = "ingest")]
pub use core_ingest as ingest;

#[cfg(feature = "ingest")]
pub use core_metadata as metadata;

#[cfg(feature = "ingest")]
pub use core_playlist as playlist;
