use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage_traits::StorageError),

    #[error("Scan cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ScannerError>;
