use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

use crate::advertisers::{Advertiser, AdvertiserRepositoryTrait, PricingModel};
use crate::coupons::CouponDirectoryTrait;
use crate::errors::{ConfigError, Error, Result};
use crate::performance::AggregatorTrait;
use crate::pricing::{MetricsCalculator, PricingTerms};
use crate::rules::RateResolver;
use crate::tiers::TierConfig;
use crate::transactions::{PricedRow, TransactionRepositoryTrait, TransactionRow};

use super::pipeline_model::{normalize, NormalizedRecord, PipelineRunSummary, RawOrderRecord};

/// Orchestrates one ingest window for one advertiser: snapshot the raw
/// feed, normalize, attribute, price, store and re-aggregate.
///
/// Re-running a window replaces its transactions and rollups wholesale, so
/// the pipeline can be pointed at the same date range any number of times.
pub struct PipelineRunner {
    advertisers: Arc<dyn AdvertiserRepositoryTrait>,
    coupons: Arc<dyn CouponDirectoryTrait>,
    resolver: RateResolver,
    transactions: Arc<dyn TransactionRepositoryTrait>,
    aggregator: Arc<dyn AggregatorTrait>,
    tiers: TierConfig,
}

impl PipelineRunner {
    pub fn new(
        advertisers: Arc<dyn AdvertiserRepositoryTrait>,
        coupons: Arc<dyn CouponDirectoryTrait>,
        resolver: RateResolver,
        transactions: Arc<dyn TransactionRepositoryTrait>,
        aggregator: Arc<dyn AggregatorTrait>,
        tiers: TierConfig,
    ) -> Self {
        Self {
            advertisers,
            coupons,
            resolver,
            transactions,
            aggregator,
            tiers,
        }
    }

    pub fn run(
        &self,
        advertiser_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        source: &str,
        records: &[RawOrderRecord],
    ) -> Result<PipelineRunSummary> {
        let advertiser = self.advertisers.get_by_id(advertiser_id)?;

        // A tiered advertiser without bracket tables is misconfigured;
        // abort before touching stored data.
        if advertiser.pricing_model == PricingModel::Tiered
            && !self.tiers.has_advertiser(advertiser_id)
        {
            return Err(Error::Config(ConfigError::MissingKey(format!(
                "No tier tables configured for advertiser {}",
                advertiser_id
            ))));
        }

        self.transactions.store_snapshot(
            advertiser_id,
            source,
            from,
            to,
            &serde_json::to_value(records)?,
        )?;

        let mut summary = PipelineRunSummary::default();
        let mut priced_rows: Vec<PricedRow> = Vec::with_capacity(records.len());

        for record in records {
            let normalized = match normalize(record) {
                Ok(normalized) => normalized,
                Err(reason) => {
                    warn!(
                        "Skipping record {:?} from {} for advertiser {}: {}",
                        record.external_id, source, advertiser_id, reason
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            let row = self.attribute(&advertiser, normalized)?;

            match self.price(&advertiser, &row) {
                Ok(priced) => {
                    priced_rows.push(priced);
                    summary.processed += 1;
                }
                Err(Error::Pricing(e)) => {
                    warn!(
                        "Failed to price record {:?} for advertiser {}: {}",
                        row.external_id, advertiser_id, e
                    );
                    summary.errored += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.transactions
            .replace_range(advertiser_id, from, to, &priced_rows)?;
        self.aggregator.rebuild_rollups(advertiser_id, from, to)?;

        info!(
            "Pipeline run for advertiser {} ({} to {}): {} processed, {} skipped, {} errored",
            advertiser_id, from, to, summary.processed, summary.skipped, summary.errored
        );

        Ok(summary)
    }

    /// Attach the partner that owned the record's coupon at order time.
    /// Rows without a resolvable coupon stay unattributed and are priced
    /// against the advertiser's default terms.
    fn attribute(
        &self,
        advertiser: &Advertiser,
        record: NormalizedRecord,
    ) -> Result<TransactionRow> {
        let mut partner_id = None;
        let mut partner_type = None;
        let mut geo = record.geo;

        if let Some(code) = record.coupon_code.as_deref() {
            if let Some(owner) = self.coupons.owner_at(&advertiser.id, code, record.order_at)? {
                partner_id = Some(owner.partner_id);
                partner_type = Some(owner.partner_type);
            }
            if geo.is_none() {
                geo = self
                    .coupons
                    .get_by_code(&advertiser.id, code)?
                    .and_then(|coupon| coupon.geo);
            }
        }

        Ok(TransactionRow {
            external_id: record.external_id,
            advertiser_id: advertiser.id.clone(),
            partner_id,
            partner_type,
            coupon_code: record.coupon_code,
            geo,
            order_at: record.order_at,
            user_segment: record.user_segment,
            orders: record.orders,
            sales: record.sales,
            currency: record.currency.unwrap_or_else(|| advertiser.currency.clone()),
        })
    }

    fn price(&self, advertiser: &Advertiser, row: &TransactionRow) -> Result<PricedRow> {
        match advertiser.pricing_model {
            PricingModel::Percent | PricingModel::Fixed => {
                let rates = self.resolver.resolve(
                    advertiser,
                    row.partner_id.as_deref(),
                    row.user_segment,
                    row.order_at,
                )?;
                Ok(MetricsCalculator::compute(
                    row,
                    PricingTerms::Rated {
                        revenue: rates.revenue,
                        payout: rates.payout,
                        exchange_rate: rates.exchange_rate,
                    },
                )?)
            }
            PricingModel::Tiered => {
                let table = self
                    .tiers
                    .table_for(&advertiser.id, row.geo.as_deref())
                    .ok_or_else(|| {
                        Error::Config(ConfigError::MissingKey(format!(
                            "No tier table for advertiser {} geo {:?}",
                            advertiser.id, row.geo
                        )))
                    })?;
                let has_special_tier = self.resolver.has_special_tier(
                    &advertiser.id,
                    row.partner_id.as_deref(),
                    row.order_at,
                )?;
                Ok(MetricsCalculator::compute(
                    row,
                    PricingTerms::Tiered {
                        table,
                        has_special_tier,
                    },
                )?)
            }
        }
    }
}
