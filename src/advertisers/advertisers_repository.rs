use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::schema::advertisers;
use crate::schema::advertisers::dsl::*;

use super::advertisers_errors::{AdvertiserError, Result};
use super::advertisers_model::{Advertiser, AdvertiserDB, NewAdvertiser};
use super::advertisers_traits::AdvertiserRepositoryTrait;

/// Repository for managing advertiser configuration in the database
pub struct AdvertiserRepository {
    pool: Arc<DbPool>,
}

impl AdvertiserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl AdvertiserRepositoryTrait for AdvertiserRepository {
    fn create(&self, new_advertiser: NewAdvertiser) -> Result<Advertiser> {
        new_advertiser.validate()?;

        let mut advertiser_db: AdvertiserDB = new_advertiser.into();
        if advertiser_db.id.is_empty() {
            advertiser_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| AdvertiserError::DatabaseError(e.to_string()))?;

        diesel::insert_into(advertisers::table)
            .values(&advertiser_db)
            .execute(&mut conn)
            .map_err(|e| AdvertiserError::DatabaseError(e.to_string()))?;

        Ok(advertiser_db.into())
    }

    fn get_by_id(&self, advertiser_id_value: &str) -> Result<Advertiser> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AdvertiserError::DatabaseError(e.to_string()))?;

        let advertiser = advertisers
            .find(advertiser_id_value)
            .first::<AdvertiserDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AdvertiserError::NotFound(format!(
                    "Advertiser with id {} not found",
                    advertiser_id_value
                )),
                _ => AdvertiserError::DatabaseError(e.to_string()),
            })?;

        Ok(advertiser.into())
    }

    fn get_by_name(&self, advertiser_name: &str) -> Result<Advertiser> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AdvertiserError::DatabaseError(e.to_string()))?;

        let advertiser = advertisers
            .filter(name.eq(advertiser_name))
            .first::<AdvertiserDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AdvertiserError::NotFound(format!(
                    "Advertiser '{}' not found",
                    advertiser_name
                )),
                _ => AdvertiserError::DatabaseError(e.to_string()),
            })?;

        Ok(advertiser.into())
    }

    fn list(&self) -> Result<Vec<Advertiser>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AdvertiserError::DatabaseError(e.to_string()))?;

        advertisers
            .order(name.asc())
            .load::<AdvertiserDB>(&mut conn)
            .map_err(|e| AdvertiserError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Advertiser::from).collect())
    }
}
