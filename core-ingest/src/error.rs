use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Ingest cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, IngestError>;
