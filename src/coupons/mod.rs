// Module declarations
pub(crate) mod coupons_errors;
pub(crate) mod coupons_model;
pub(crate) mod coupons_repository;
pub(crate) mod coupons_traits;

// Re-export the public interface
pub use coupons_model::{Coupon, CouponAssignmentDB, CouponDB, CouponOwner, NewCoupon};
pub use coupons_repository::CouponRepository;
pub use coupons_traits::CouponDirectoryTrait;

// Re-export error types for convenience
pub use coupons_errors::{CouponError, Result};
