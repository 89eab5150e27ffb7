use thiserror::Error;

/// Custom error type for metric computation
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for pricing operations
pub type Result<T> = std::result::Result<T, PricingError>;
