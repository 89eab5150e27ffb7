// Module declarations
pub(crate) mod partners_errors;
pub(crate) mod partners_model;
pub(crate) mod partners_repository;
pub(crate) mod partners_traits;

// Re-export the public interface
pub use partners_model::{NewPartner, Partner, PartnerDB, PartnerType};
pub use partners_repository::PartnerRepository;
pub use partners_traits::PartnerRepositoryTrait;

// Re-export error types for convenience
pub use partners_errors::{PartnerError, Result};
