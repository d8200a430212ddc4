//! The ingestion service.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use core_library::repositories::MetadataStore;
use core_library::KnownFiles;
use core_metadata::{MetadataError, MusicFileScanner, ScanMode};
use core_playlist::PlaylistError;
use core_scanner::FolderScanner;
use storage_traits::{StorageFile, StorageFolder, StorageItem};

use crate::error::{IngestError, Result};

/// Extensions treated as audio and routed through the metadata pipeline.
const AUDIO_EXTENSIONS: &[&str] = &[
    "flac", "mp3", "m4a", "aac", "ogg", "opus", "wav", "aif", "aiff", "wma",
];

/// Tunables for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Extraction methods applied to each audio file
    pub scan_mode: ScanMode,
    /// Extensions (lower-case, no dot) scanned as audio
    pub audio_extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::ALL,
            audio_extensions: AUDIO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files the walk discovered
    pub files_seen: usize,
    /// Audio files that produced a committed track
    pub tracks_indexed: usize,
    /// Audio files that produced no metadata (absent tag/properties,
    /// corrupt content); these degrade gracefully, never aborting the run
    pub files_skipped: usize,
    /// Playlist files committed
    pub playlists_parsed: usize,
}

/// Drives a full scan of a storage tree into a [`MetadataStore`].
pub struct IngestService {
    folder_scanner: FolderScanner,
    file_scanner: MusicFileScanner,
    store: MetadataStore,
    config: IngestConfig,
}

impl IngestService {
    pub fn new(store: MetadataStore) -> Self {
        Self::with_config(store, IngestConfig::default())
    }

    pub fn with_config(store: MetadataStore, config: IngestConfig) -> Self {
        Self {
            folder_scanner: FolderScanner::new(KnownFiles::new()),
            file_scanner: MusicFileScanner::new(),
            store,
            config,
        }
    }

    /// The live known-files index (kept current by folder watching).
    pub fn known_files(&self) -> KnownFiles {
        self.folder_scanner.known_files()
    }

    /// The repositories this service commits into.
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Ingest everything under `root`.
    ///
    /// Audio files run through extract/merge/assign/cross-link and are
    /// committed per file; a file that yields nothing is counted and
    /// skipped. Playlists are parsed only after discovery completes, so
    /// their references are checked against the full known-files index.
    pub async fn ingest(
        &self,
        root: Arc<dyn StorageFolder>,
        cancel: &CancellationToken,
    ) -> Result<IngestReport> {
        if cancel.is_cancelled() {
            return Err(IngestError::Cancelled);
        }

        let mut report = IngestReport::default();
        let known_files = self.known_files();
        let mut playlist_candidates: Vec<Arc<dyn StorageFile>> = Vec::new();

        let mut discovered = self.folder_scanner.scan(root, cancel.clone()).await;
        while let Some(file) = discovered.recv().await {
            if cancel.is_cancelled() {
                return Err(IngestError::Cancelled);
            }
            report.files_seen += 1;

            if self.is_audio(&file) {
                match self
                    .file_scanner
                    .scan_music_file(&file, self.config.scan_mode, cancel)
                    .await
                {
                    Ok(Some(record)) => {
                        self.store.commit_record(&record).await?;
                        report.tracks_indexed += 1;
                    }
                    Ok(None) => report.files_skipped += 1,
                    Err(MetadataError::Cancelled) => return Err(IngestError::Cancelled),
                    Err(e) => {
                        warn!(file = file.id(), error = %e, "scan failed, skipping file");
                        report.files_skipped += 1;
                    }
                }
            } else {
                playlist_candidates.push(file);
            }
        }

        if cancel.is_cancelled() {
            return Err(IngestError::Cancelled);
        }

        for file in playlist_candidates {
            match core_playlist::parse_playlist(&file, &known_files, cancel).await {
                Ok(Some(playlist)) => {
                    self.store.commit_playlist(playlist).await?;
                    report.playlists_parsed += 1;
                }
                Ok(None) => {}
                Err(PlaylistError::Cancelled) => return Err(IngestError::Cancelled),
                Err(e) => warn!(file = file.id(), error = %e, "playlist parse failed"),
            }
        }

        info!(
            files = report.files_seen,
            tracks = report.tracks_indexed,
            playlists = report.playlists_parsed,
            "ingest complete"
        );
        Ok(report)
    }

    /// Release watch subscriptions held by the folder scanner.
    pub async fn shutdown(&self) {
        self.folder_scanner.shutdown().await;
    }

    fn is_audio(&self, file: &Arc<dyn StorageFile>) -> bool {
        file.extension()
            .map(|ext| self.config.audio_extensions.iter().any(|a| *a == ext))
            .unwrap_or(false)
    }
}
