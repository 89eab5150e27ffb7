// Module declarations
pub(crate) mod advertisers_errors;
pub(crate) mod advertisers_model;
pub(crate) mod advertisers_repository;
pub(crate) mod advertisers_traits;

// Re-export the public interface
pub use advertisers_model::{Advertiser, AdvertiserDB, NewAdvertiser, PricingModel};
pub use advertisers_repository::AdvertiserRepository;
pub use advertisers_traits::AdvertiserRepositoryTrait;

// Re-export error types for convenience
pub use advertisers_errors::{AdvertiserError, Result};
