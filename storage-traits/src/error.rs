use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Operation not supported by this backend: {0}")]
    NotSupported(String),

    #[error("Watch failed: {0}")]
    Watch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
