use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

use crate::transactions::TransactionRepositoryTrait;

use super::performance_errors::{PerformanceError, Result};
use super::performance_model::build_rollups;
use super::performance_traits::{AggregatorTrait, PerformanceRepositoryTrait};

/// Rebuilds daily rollups from the priced transaction store.
pub struct PerformanceService {
    transactions: Arc<dyn TransactionRepositoryTrait>,
    rollups: Arc<dyn PerformanceRepositoryTrait>,
}

impl PerformanceService {
    pub fn new(
        transactions: Arc<dyn TransactionRepositoryTrait>,
        rollups: Arc<dyn PerformanceRepositoryTrait>,
    ) -> Self {
        Self {
            transactions,
            rollups,
        }
    }
}

impl AggregatorTrait for PerformanceService {
    fn rebuild_rollups(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<usize> {
        let rows = self
            .transactions
            .list_range(advertiser_id, from, to)
            .map_err(|e| PerformanceError::DatabaseError(e.to_string()))?;

        let rollups = build_rollups(&rows);
        debug!(
            "Rebuilding {} rollups from {} transactions for advertiser {} ({} to {})",
            rollups.len(),
            rows.len(),
            advertiser_id,
            from,
            to
        );

        self.rollups.replace_range(advertiser_id, from, to, &rollups)
    }
}
