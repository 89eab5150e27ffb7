use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use crate::constants::INSERT_CHUNK_SIZE;
use crate::db::{get_connection, DbPool, DbTransactionExecutor};
use crate::schema::{raw_snapshots, transactions};

use super::transactions_errors::{Result, TransactionError};
use super::transactions_model::{PricedRow, PricedRowDB, RawSnapshotDB};
use super::transactions_traits::TransactionRepositoryTrait;

pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn replace_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        rows: &[PricedRow],
    ) -> Result<usize> {
        let db_rows: Vec<PricedRowDB> = rows.iter().map(PricedRowDB::from).collect();
        let advertiser_id = advertiser_id.to_string();

        self.pool
            .execute(move |conn| -> Result<usize> {
                diesel::delete(
                    transactions::table
                        .filter(transactions::advertiser_id.eq(&advertiser_id))
                        .filter(transactions::order_date.ge(from))
                        .filter(transactions::order_date.le(to)),
                )
                .execute(conn)
                .map_err(TransactionError::from)?;

                let mut inserted = 0;
                // SQLite caps the number of bound variables per statement.
                for chunk in db_rows.chunks(INSERT_CHUNK_SIZE) {
                    inserted += diesel::insert_into(transactions::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(TransactionError::from)?;
                }

                Ok(inserted)
            })
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))
    }

    fn list_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricedRow>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let rows = transactions::table
            .filter(transactions::advertiser_id.eq(advertiser_id))
            .filter(transactions::order_date.ge(from))
            .filter(transactions::order_date.le(to))
            .order((transactions::order_at.asc(), transactions::id.asc()))
            .load::<PricedRowDB>(&mut conn)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(PricedRow::from).collect())
    }

    fn store_snapshot(
        &self,
        advertiser_id: &str,
        source: &str,
        from: NaiveDate,
        to: NaiveDate,
        payload: &serde_json::Value,
    ) -> Result<()> {
        let snapshot = RawSnapshotDB {
            id: uuid::Uuid::new_v4().to_string(),
            advertiser_id: advertiser_id.to_string(),
            source: source.to_string(),
            date_from: from,
            date_to: to,
            payload: payload.to_string(),
            fetched_at: chrono::Utc::now().naive_utc(),
        };

        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        diesel::insert_into(raw_snapshots::table)
            .values(&snapshot)
            .execute(&mut conn)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
