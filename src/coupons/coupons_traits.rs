use chrono::NaiveDateTime;

use super::coupons_errors::Result;
use super::coupons_model::{Coupon, CouponOwner, NewCoupon};

/// Trait defining the contract for the coupon/partner directory.
pub trait CouponDirectoryTrait: Send + Sync {
    fn create(&self, new_coupon: NewCoupon) -> Result<Coupon>;
    fn assign(
        &self,
        coupon_id: &str,
        partner_id: &str,
        assigned_at: NaiveDateTime,
    ) -> Result<()>;
    fn get_by_code(&self, advertiser_id: &str, code: &str) -> Result<Option<Coupon>>;
    /// Resolve which partner owned a coupon at a specific timestamp.
    fn owner_at(
        &self,
        advertiser_id: &str,
        code: &str,
        at: NaiveDateTime,
    ) -> Result<Option<CouponOwner>>;
}
