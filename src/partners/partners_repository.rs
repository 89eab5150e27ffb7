use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::schema::partners;
use crate::schema::partners::dsl::*;

use super::partners_errors::{PartnerError, Result};
use super::partners_model::{NewPartner, Partner, PartnerDB};
use super::partners_traits::PartnerRepositoryTrait;

/// Repository for the partner directory
pub struct PartnerRepository {
    pool: Arc<DbPool>,
}

impl PartnerRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl PartnerRepositoryTrait for PartnerRepository {
    fn create(&self, new_partner: NewPartner) -> Result<Partner> {
        new_partner.validate()?;

        let mut partner_db: PartnerDB = new_partner.into();
        if partner_db.id.is_empty() {
            partner_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn =
            get_connection(&self.pool).map_err(|e| PartnerError::DatabaseError(e.to_string()))?;

        diesel::insert_into(partners::table)
            .values(&partner_db)
            .execute(&mut conn)
            .map_err(|e| PartnerError::DatabaseError(e.to_string()))?;

        Ok(partner_db.into())
    }

    fn get_by_id(&self, partner_id_value: &str) -> Result<Partner> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| PartnerError::DatabaseError(e.to_string()))?;

        let partner = partners
            .find(partner_id_value)
            .first::<PartnerDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => PartnerError::NotFound(format!(
                    "Partner with id {} not found",
                    partner_id_value
                )),
                _ => PartnerError::DatabaseError(e.to_string()),
            })?;

        Ok(partner.into())
    }

    fn list(&self) -> Result<Vec<Partner>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| PartnerError::DatabaseError(e.to_string()))?;

        partners
            .order(name.asc())
            .load::<PartnerDB>(&mut conn)
            .map_err(|e| PartnerError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Partner::from).collect())
    }
}
