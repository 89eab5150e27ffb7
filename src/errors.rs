use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::advertisers::AdvertiserError;
use crate::coupons::CouponError;
use crate::partners::PartnerError;
use crate::performance::PerformanceError;
use crate::pricing::PricingError;
use crate::rules::RuleError;
use crate::tiers::TierError;
use crate::transactions::TransactionError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pricing engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Advertiser error: {0}")]
    Advertiser(#[from] AdvertiserError),

    #[error("Partner error: {0}")]
    Partner(#[from] PartnerError),

    #[error("Coupon error: {0}")]
    Coupon(#[from] CouponError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Tier table error: {0}")]
    Tier(#[from] TierError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Performance rollup error: {0}")]
    Performance(#[from] PerformanceError),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    IO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing configuration key: {0}")]
    MissingKey(String),
}

// Implement From for DieselError to Error directly
impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Database(DatabaseError::PoolCreationFailed(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Config(ConfigError::IO(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}
