//! Per-file scan orchestration.

use lofty::config::ParseOptions;
use std::ops::BitOr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use core_library::FileScanRecord;
use storage_traits::{StorageFile, StorageItem};

use crate::error::{MetadataError, Result};
use crate::{assign, link, merge, properties, tag};

/// Bitset selecting which extraction methods run for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMode(u8);

impl ScanMode {
    /// Embedded-tag extraction only
    pub const TAGS: ScanMode = ScanMode(0b01);
    /// Filesystem-property extraction only
    pub const PROPERTIES: ScanMode = ScanMode(0b10);
    /// Both methods, merged
    pub const ALL: ScanMode = ScanMode(0b11);

    pub fn contains(self, other: ScanMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ScanMode {
    type Output = ScanMode;

    fn bitor(self, rhs: ScanMode) -> ScanMode {
        ScanMode(self.0 | rhs.0)
    }
}

/// Scans one music file into a finished, cross-linked [`FileScanRecord`].
///
/// The per-file pipeline (extract, merge, assign identifiers, cross-link)
/// is atomic from the caller's perspective: nothing observes a record
/// mid-pipeline.
pub struct MusicFileScanner {
    parse_options: ParseOptions,
}

impl MusicFileScanner {
    /// Create a scanner with default tag parse options
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::new(),
        }
    }

    /// Create a scanner with custom tag parse options
    pub fn with_options(parse_options: ParseOptions) -> Self {
        Self { parse_options }
    }

    /// Scan one file with the selected extraction methods.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` when at least one method produced metadata;
    ///   the record has identifiers assigned and relationships cross-linked
    /// - `Ok(None)` when no method produced anything, including when the
    ///   file is corrupt or unreadable: one bad file never aborts a batch
    ///
    /// # Errors
    ///
    /// Only cancellation is surfaced as an error; it is distinct from
    /// "no result found" and is never swallowed.
    pub async fn scan_music_file(
        &self,
        file: &Arc<dyn StorageFile>,
        mode: ScanMode,
        cancel: &CancellationToken,
    ) -> Result<Option<FileScanRecord>> {
        let mut records = Vec::new();

        if mode.contains(ScanMode::TAGS) {
            match tag::scan_tags(file, self.parse_options, cancel).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(MetadataError::Cancelled) => return Err(MetadataError::Cancelled),
                Err(e) => warn!(file = file.id(), error = %e, "tag extraction failed"),
            }
        }

        if mode.contains(ScanMode::PROPERTIES) {
            match properties::scan_properties(file, cancel).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(MetadataError::Cancelled) => return Err(MetadataError::Cancelled),
                Err(e) => warn!(file = file.id(), error = %e, "property extraction failed"),
            }
        }

        if records.is_empty() {
            return Ok(None);
        }
        if cancel.is_cancelled() {
            return Err(MetadataError::Cancelled);
        }

        let mut record = merge::merge(records);
        assign::assign_ids(file.id(), &mut record);
        link::cross_link(&mut record);
        Ok(Some(record))
    }
}

impl Default for MusicFileScanner {
    fn default() -> Self {
        Self::new()
    }
}
