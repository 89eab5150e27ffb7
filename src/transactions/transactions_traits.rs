use chrono::NaiveDate;

use super::transactions_errors::Result;
use super::transactions_model::PricedRow;

/// Trait defining the contract for priced transaction storage.
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Atomically replace the advertiser's rows in `[from, to]` with the
    /// given batch. Re-running an ingest for a window must never double
    /// count, so the window is rebuilt rather than merged.
    fn replace_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        rows: &[PricedRow],
    ) -> Result<usize>;

    fn list_range(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricedRow>>;

    /// Persist the raw upstream payload before any normalization, for
    /// replay and audit.
    fn store_snapshot(
        &self,
        advertiser_id: &str,
        source: &str,
        from: NaiveDate,
        to: NaiveDate,
        payload: &serde_json::Value,
    ) -> Result<()>;
}
