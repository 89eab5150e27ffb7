use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for partner-related operations
#[derive(Debug, Error)]
pub enum PartnerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for PartnerError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PartnerError::NotFound("Record not found".to_string()),
            _ => PartnerError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for partner operations
pub type Result<T> = std::result::Result<T, PartnerError>;
