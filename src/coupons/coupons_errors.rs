use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for coupon directory operations
#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for CouponError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => CouponError::NotFound("Record not found".to_string()),
            _ => CouponError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for coupon operations
pub type Result<T> = std::result::Result<T, CouponError>;
