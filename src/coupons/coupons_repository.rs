use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::partners::{PartnerDB, PartnerType};
use crate::schema::{coupon_assignments, coupons, partners};

use super::coupons_errors::{CouponError, Result};
use super::coupons_model::{Coupon, CouponAssignmentDB, CouponDB, CouponOwner, NewCoupon};
use super::coupons_traits::CouponDirectoryTrait;

/// Repository backing the coupon/partner directory.
pub struct CouponRepository {
    pool: Arc<DbPool>,
}

impl CouponRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn partner_type_of(
        &self,
        conn: &mut crate::db::DbConnection,
        partner_id_value: &str,
    ) -> Result<Option<PartnerType>> {
        let partner = partners::table
            .find(partner_id_value)
            .first::<PartnerDB>(conn)
            .optional()
            .map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        Ok(partner.and_then(|p| PartnerType::parse(&p.partner_type)))
    }
}

impl CouponDirectoryTrait for CouponRepository {
    fn create(&self, new_coupon: NewCoupon) -> Result<Coupon> {
        new_coupon.validate()?;

        let now = chrono::Utc::now().naive_utc();
        let coupon_db = CouponDB {
            id: new_coupon
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            code: new_coupon.normalized_code(),
            advertiser_id: new_coupon.advertiser_id.clone(),
            partner_id: new_coupon.partner_id.clone(),
            geo: new_coupon.geo.clone(),
            created_at: now,
        };

        let mut conn =
            get_connection(&self.pool).map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        diesel::insert_into(coupons::table)
            .values(&coupon_db)
            .execute(&mut conn)
            .map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        // The initial assignment is part of the ownership history too.
        if let Some(owner_id) = &coupon_db.partner_id {
            let assignment = CouponAssignmentDB {
                id: uuid::Uuid::new_v4().to_string(),
                coupon_id: coupon_db.id.clone(),
                partner_id: owner_id.clone(),
                assigned_at: now,
            };
            diesel::insert_into(coupon_assignments::table)
                .values(&assignment)
                .execute(&mut conn)
                .map_err(|e| CouponError::DatabaseError(e.to_string()))?;
        }

        Ok(coupon_db.into())
    }

    fn assign(
        &self,
        coupon_id_value: &str,
        partner_id_value: &str,
        assigned_at_value: NaiveDateTime,
    ) -> Result<()> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        let assignment = CouponAssignmentDB {
            id: uuid::Uuid::new_v4().to_string(),
            coupon_id: coupon_id_value.to_string(),
            partner_id: partner_id_value.to_string(),
            assigned_at: assigned_at_value,
        };

        diesel::insert_into(coupon_assignments::table)
            .values(&assignment)
            .execute(&mut conn)
            .map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        diesel::update(coupons::table.find(coupon_id_value))
            .set(coupons::partner_id.eq(partner_id_value))
            .execute(&mut conn)
            .map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    fn get_by_code(&self, advertiser_id_value: &str, code_value: &str) -> Result<Option<Coupon>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        let normalized = code_value.trim().to_uppercase();
        let coupon = coupons::table
            .filter(coupons::advertiser_id.eq(advertiser_id_value))
            .filter(coupons::code.eq(&normalized))
            .first::<CouponDB>(&mut conn)
            .optional()
            .map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        Ok(coupon.map(Coupon::from))
    }

    fn owner_at(
        &self,
        advertiser_id_value: &str,
        code_value: &str,
        at: NaiveDateTime,
    ) -> Result<Option<CouponOwner>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        let normalized = code_value.trim().to_uppercase();
        let coupon = coupons::table
            .filter(coupons::advertiser_id.eq(advertiser_id_value))
            .filter(coupons::code.eq(&normalized))
            .first::<CouponDB>(&mut conn)
            .optional()
            .map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        let coupon = match coupon {
            Some(c) => c,
            None => return Ok(None),
        };

        // Most recent assignment on or before the order timestamp wins;
        // without history, fall back to the current assignment.
        let historical = coupon_assignments::table
            .filter(coupon_assignments::coupon_id.eq(&coupon.id))
            .filter(coupon_assignments::assigned_at.le(at))
            .order(coupon_assignments::assigned_at.desc())
            .first::<CouponAssignmentDB>(&mut conn)
            .optional()
            .map_err(|e| CouponError::DatabaseError(e.to_string()))?;

        let owner_id = match historical {
            Some(assignment) => Some(assignment.partner_id),
            None => coupon.partner_id,
        };

        let owner_id = match owner_id {
            Some(id) => id,
            None => return Ok(None),
        };

        match self.partner_type_of(&mut conn, &owner_id)? {
            Some(partner_type) => Ok(Some(CouponOwner {
                partner_id: owner_id,
                partner_type,
            })),
            None => Ok(None),
        }
    }
}
