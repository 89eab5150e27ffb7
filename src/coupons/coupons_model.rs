use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::partners::PartnerType;

use super::coupons_errors::{CouponError, Result};

/// Domain model for a coupon code owned by an advertiser.
///
/// `partner_id` is the coupon's current assignment; historical ownership is
/// kept in `coupon_assignments` so old rows can be re-priced against the
/// partner that owned the code at the time of the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub geo: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for creating a coupon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub geo: Option<String>,
}

impl NewCoupon {
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(CouponError::InvalidData(
                "Coupon code cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Coupon codes are matched case-insensitively; store them uppercased.
    pub fn normalized_code(&self) -> String {
        self.code.trim().to_uppercase()
    }
}

/// The partner that owned a coupon at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponOwner {
    pub partner_id: String,
    pub partner_type: PartnerType,
}

/// Database model for coupons
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::coupons)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CouponDB {
    pub id: String,
    pub code: String,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub geo: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Database model for a dated coupon-to-partner assignment
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::coupon_assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CouponAssignmentDB {
    pub id: String,
    pub coupon_id: String,
    pub partner_id: String,
    pub assigned_at: NaiveDateTime,
}

impl From<CouponDB> for Coupon {
    fn from(db: CouponDB) -> Self {
        Self {
            id: db.id,
            code: db.code,
            advertiser_id: db.advertiser_id,
            partner_id: db.partner_id,
            geo: db.geo,
            created_at: db.created_at,
        }
    }
}
