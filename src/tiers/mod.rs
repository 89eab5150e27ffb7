// Module declarations
pub(crate) mod tiers_errors;
pub(crate) mod tiers_model;

// Re-export the public interface
pub use tiers_model::{TierBracket, TierConfig, TierSchedule, TierTable, ANY_REGION};

// Re-export error types for convenience
pub use tiers_errors::{Result, TierError};
