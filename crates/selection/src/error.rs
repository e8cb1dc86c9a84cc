use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Search backend error: {0}")]
    Backend(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Bulk resolution timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, SelectionError>;
