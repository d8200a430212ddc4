//! # Library Ingestion Service
//!
//! Wires the folder scanner, the per-file metadata pipeline, the
//! accumulation repositories and the playlist dispatcher into one
//! operation: point it at a root folder and get back a populated,
//! cross-linked metadata graph.
//!
//! Audio files are scanned as they are discovered; playlist files are held
//! until the walk finishes so their references resolve against the fully
//! populated known-files index.

pub mod error;
pub mod service;

pub use error::{IngestError, Result};
pub use service::{IngestConfig, IngestReport, IngestService};
