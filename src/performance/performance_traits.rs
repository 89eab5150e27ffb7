use chrono::NaiveDate;

use super::performance_errors::Result;
use super::performance_model::{NewPerformanceRollup, PerformanceRollup};

/// Trait defining the contract for rollup storage.
pub trait PerformanceRepositoryTrait: Send + Sync {
    /// Atomically replace the advertiser's rollups in `[from, to]`.
    fn replace_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        rollups: &[NewPerformanceRollup],
    ) -> Result<usize>;

    fn list_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PerformanceRollup>>;
}

/// Trait defining the contract for the rollup rebuild service.
pub trait AggregatorTrait: Send + Sync {
    /// Rebuild the daily rollups for a window from the stored transactions.
    fn rebuild_rollups(&self, advertiser_id: &str, from: NaiveDate, to: NaiveDate)
        -> Result<usize>;
}
