use thiserror::Error;

/// Custom error type for tier bracket configuration
#[derive(Debug, Error)]
pub enum TierError {
    #[error("Invalid tier configuration: {0}")]
    InvalidData(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for tier operations
pub type Result<T> = std::result::Result<T, TierError>;
