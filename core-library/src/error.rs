use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Missing identifier on {entity_type}; identity assignment must run before commit")]
    MissingIdentifier { entity_type: &'static str },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
