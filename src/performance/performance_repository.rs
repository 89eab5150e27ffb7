use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use crate::constants::INSERT_CHUNK_SIZE;
use crate::db::{get_connection, DbPool, DbTransactionExecutor};
use crate::schema::performance_rollups;

use super::performance_errors::{PerformanceError, Result};
use super::performance_model::{NewPerformanceRollup, PerformanceRollup, PerformanceRollupDB};
use super::performance_traits::PerformanceRepositoryTrait;

pub struct PerformanceRepository {
    pool: Arc<DbPool>,
}

impl PerformanceRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl PerformanceRepositoryTrait for PerformanceRepository {
    fn replace_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        rollups: &[NewPerformanceRollup],
    ) -> Result<usize> {
        let db_rollups: Vec<PerformanceRollupDB> =
            rollups.iter().map(PerformanceRollupDB::from).collect();
        let advertiser_id = advertiser_id.to_string();

        self.pool
            .execute(move |conn| -> Result<usize> {
                diesel::delete(
                    performance_rollups::table
                        .filter(performance_rollups::advertiser_id.eq(&advertiser_id))
                        .filter(performance_rollups::rollup_date.ge(from))
                        .filter(performance_rollups::rollup_date.le(to)),
                )
                .execute(conn)
                .map_err(PerformanceError::from)?;

                let mut inserted = 0;
                for chunk in db_rollups.chunks(INSERT_CHUNK_SIZE) {
                    inserted += diesel::insert_into(performance_rollups::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(PerformanceError::from)?;
                }

                Ok(inserted)
            })
            .map_err(|e| PerformanceError::DatabaseError(e.to_string()))
    }

    fn list_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PerformanceRollup>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PerformanceError::DatabaseError(e.to_string()))?;

        let rollups = performance_rollups::table
            .filter(performance_rollups::advertiser_id.eq(advertiser_id))
            .filter(performance_rollups::rollup_date.ge(from))
            .filter(performance_rollups::rollup_date.le(to))
            .order((
                performance_rollups::rollup_date.asc(),
                performance_rollups::partner_id.asc(),
                performance_rollups::coupon_code.asc(),
            ))
            .load::<PerformanceRollupDB>(&mut conn)
            .map_err(|e| PerformanceError::DatabaseError(e.to_string()))?;

        Ok(rollups.into_iter().map(PerformanceRollup::from).collect())
    }
}
