use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to extract metadata: {0}")]
    ExtractionFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage_traits::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scan cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, MetadataError>;
