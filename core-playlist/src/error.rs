use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage_traits::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
