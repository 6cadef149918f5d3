use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field is missing or malformed. The operation was rejected
    /// and the collection is untouched.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The referenced id does not exist in the collection.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The persistence layer failed to write. In-memory state is still valid.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn validation(message: &str) -> Self {
        CoreError::Validation(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        CoreError::NotFound(message.to_string())
    }

    pub fn storage(message: &str) -> Self {
        CoreError::Storage(message.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
