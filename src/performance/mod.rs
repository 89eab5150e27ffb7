// Module declarations
pub(crate) mod performance_errors;
pub(crate) mod performance_model;
pub(crate) mod performance_repository;
pub(crate) mod performance_service;
pub(crate) mod performance_traits;

// Re-export the public interface
pub use performance_model::{
    build_rollups, NewPerformanceRollup, PerformanceRollup, PerformanceRollupDB,
};
pub use performance_repository::PerformanceRepository;
pub use performance_service::PerformanceService;
pub use performance_traits::{AggregatorTrait, PerformanceRepositoryTrait};

// Re-export error types for convenience
pub use performance_errors::{PerformanceError, Result};
