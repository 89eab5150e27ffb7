// Module declarations
pub(crate) mod transactions_errors;
pub(crate) mod transactions_model;
pub(crate) mod transactions_repository;
pub(crate) mod transactions_traits;

// Re-export the public interface
pub use transactions_model::{
    PricedRow, PricedRowDB, RawSnapshotDB, TransactionRow, UserSegment,
};
pub use transactions_repository::TransactionRepository;
pub use transactions_traits::TransactionRepositoryTrait;

// Re-export error types for convenience
pub use transactions_errors::{Result, TransactionError};
