// Module declarations
pub(crate) mod pricing_errors;
pub(crate) mod pricing_service;

// Re-export the public interface
pub use pricing_service::{MetricsCalculator, PricingTerms};

// Re-export error types for convenience
pub use pricing_errors::{PricingError, Result};
