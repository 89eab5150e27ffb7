use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for rate-rule operations
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for RuleError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RuleError::NotFound("Record not found".to_string()),
            _ => RuleError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, RuleError>;
