use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::constants::MONEY_SCALE;
use crate::rules::{RateSpec, RateType};
use crate::tiers::TierTable;
use crate::transactions::{PricedRow, TransactionRow};

use super::pricing_errors::{PricingError, Result};

/// Everything the calculator needs to price one row, already resolved for
/// the row's timestamp, partner and segment.
#[derive(Debug, Clone, Copy)]
pub enum PricingTerms<'a> {
    /// Percent or fixed rates from the rule store. Percent revenue rates
    /// apply to sales; percent payout rates apply to the computed revenue.
    Rated {
        revenue: RateSpec,
        payout: RateSpec,
        /// USD per one unit of the advertiser's currency.
        exchange_rate: Decimal,
    },
    /// Flat per-order amounts from a bracket table, denominated in USD.
    Tiered {
        table: &'a TierTable,
        has_special_tier: bool,
    },
}

/// Computes revenue, payout and profit for normalized transaction rows.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Price one row. Media buyer rows are paid out their full revenue with
    /// zero profit regardless of the pricing model, because media spend is
    /// settled outside this system.
    pub fn compute(row: &TransactionRow, terms: PricingTerms) -> Result<PricedRow> {
        if row.orders < 0 {
            return Err(PricingError::InvalidData(format!(
                "Negative order count {} on row {:?}",
                row.orders, row.external_id
            )));
        }
        if row.sales < Decimal::ZERO {
            return Err(PricingError::InvalidData(format!(
                "Negative sales {} on row {:?}",
                row.sales, row.external_id
            )));
        }

        let orders = Decimal::from(row.orders);

        let (revenue, payout, exchange_rate, audit) = match terms {
            PricingTerms::Rated {
                revenue,
                payout,
                exchange_rate,
            } => {
                let revenue_amount = rated_amount(&revenue, row.sales, orders);
                let payout_amount = rated_amount(&payout, revenue_amount, orders);
                (revenue_amount, payout_amount, exchange_rate, payout)
            }
            PricingTerms::Tiered {
                table,
                has_special_tier,
            } => {
                let per_order = if row.orders == 0 {
                    Decimal::ZERO
                } else {
                    row.sales / orders
                };
                let revenue_amount = table.revenue_amount(per_order) * orders;
                let payout_per_order = table.payout_amount(per_order, has_special_tier);
                let payout_amount = payout_per_order * orders;
                // Tier amounts are USD already; no conversion applies.
                let audit = RateSpec {
                    rate_type: RateType::Fixed,
                    rate: payout_per_order,
                    fixed_bonus: Decimal::ZERO,
                };
                (revenue_amount, payout_amount, Decimal::ONE, audit)
            }
        };

        let is_media_buyer = row
            .partner_type
            .map(|t| t.is_media_buyer())
            .unwrap_or(false);
        let payout = if is_media_buyer { revenue } else { payout };
        let profit = revenue - payout;

        let round = |v: Decimal| v.round_dp(MONEY_SCALE);

        Ok(PricedRow {
            id: uuid::Uuid::new_v4().to_string(),
            external_id: row.external_id.clone(),
            advertiser_id: row.advertiser_id.clone(),
            partner_id: row.partner_id.clone(),
            partner_type: row.partner_type,
            coupon_code: row.coupon_code.clone(),
            geo: row.geo.clone(),
            order_at: row.order_at,
            order_date: row.order_at.date(),
            user_segment: row.user_segment,
            orders: row.orders,
            sales: round(row.sales),
            currency: row.currency.clone(),
            rate_type: audit.rate_type,
            rate_value: audit.rate,
            fixed_bonus: audit.fixed_bonus,
            revenue: round(revenue),
            payout: round(payout),
            profit: round(profit),
            revenue_usd: round(revenue * exchange_rate),
            payout_usd: round(payout * exchange_rate),
            profit_usd: round(profit * exchange_rate),
            created_at: chrono::Utc::now().naive_utc(),
        })
    }
}

fn rated_amount(spec: &RateSpec, percent_base: Decimal, orders: Decimal) -> Decimal {
    let base_amount = match spec.rate_type {
        RateType::Percent => percent_base * spec.rate / dec!(100),
        RateType::Fixed => orders * spec.rate,
    };
    base_amount + orders * spec.fixed_bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partners::PartnerType;
    use crate::tiers::{TierBracket, TierSchedule};
    use crate::transactions::UserSegment;
    use chrono::NaiveDate;

    fn row(segment: UserSegment, orders: i32, sales: Decimal) -> TransactionRow {
        TransactionRow {
            external_id: Some("ext-1".to_string()),
            advertiser_id: "adv".to_string(),
            partner_id: Some("p1".to_string()),
            partner_type: Some(PartnerType::Affiliate),
            coupon_code: Some("SAVE10".to_string()),
            geo: Some("AE".to_string()),
            order_at: NaiveDate::from_ymd_opt(2025, 4, 10)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            user_segment: segment,
            orders,
            sales,
            currency: "AED".to_string(),
        }
    }

    fn schedule(bounds: &[(Option<Decimal>, Decimal)]) -> TierSchedule {
        TierSchedule::new(
            bounds
                .iter()
                .map(|&(upper, amount)| TierBracket { upper, amount })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn percent_rates_apply_to_sales_then_revenue() {
        // 5% revenue on 800 in sales, 50% payout on the resulting revenue.
        let terms = PricingTerms::Rated {
            revenue: RateSpec {
                rate_type: RateType::Percent,
                rate: dec!(5),
                fixed_bonus: Decimal::ZERO,
            },
            payout: RateSpec {
                rate_type: RateType::Percent,
                rate: dec!(50),
                fixed_bonus: Decimal::ZERO,
            },
            exchange_rate: dec!(0.27),
        };

        let priced =
            MetricsCalculator::compute(&row(UserSegment::Rtu, 4, dec!(800)), terms).unwrap();

        assert_eq!(priced.revenue, dec!(40.00));
        assert_eq!(priced.payout, dec!(20.00));
        assert_eq!(priced.profit, dec!(20.00));
        assert_eq!(priced.revenue_usd, dec!(10.80));
        assert_eq!(priced.payout_usd, dec!(5.40));
        assert_eq!(priced.profit_usd, dec!(5.40));
    }

    #[test]
    fn fixed_rates_apply_per_order_with_bonus() {
        let terms = PricingTerms::Rated {
            revenue: RateSpec {
                rate_type: RateType::Fixed,
                rate: dec!(12),
                fixed_bonus: dec!(1),
            },
            payout: RateSpec {
                rate_type: RateType::Fixed,
                rate: dec!(7),
                fixed_bonus: dec!(0.5),
            },
            exchange_rate: Decimal::ONE,
        };

        let priced =
            MetricsCalculator::compute(&row(UserSegment::Ftu, 3, dec!(500)), terms).unwrap();

        assert_eq!(priced.revenue, dec!(39)); // 3*12 + 3*1
        assert_eq!(priced.payout, dec!(22.5)); // 3*7 + 3*0.5
        assert_eq!(priced.profit, dec!(16.5));
    }

    #[test]
    fn tiered_amounts_come_from_the_order_value_bracket() {
        let table = TierTable {
            revenue: schedule(&[(Some(dec!(200)), dec!(3.5)), (None, dec!(6))]),
            payout_default: schedule(&[(Some(dec!(200)), dec!(2.8)), (None, dec!(4.5))]),
            payout_special: Some(schedule(&[(Some(dec!(200)), dec!(3.2)), (None, dec!(5))])),
        };

        // One order worth 180 lands in the under-200 bracket.
        let priced = MetricsCalculator::compute(
            &row(UserSegment::Ftu, 1, dec!(180)),
            PricingTerms::Tiered {
                table: &table,
                has_special_tier: false,
            },
        )
        .unwrap();

        assert_eq!(priced.revenue_usd, dec!(3.5));
        assert_eq!(priced.payout_usd, dec!(2.8));
        assert_eq!(priced.profit_usd, dec!(0.7));

        // The same row from a partner with a payout rule on file gets the
        // special bracket amounts.
        let priced = MetricsCalculator::compute(
            &row(UserSegment::Ftu, 1, dec!(180)),
            PricingTerms::Tiered {
                table: &table,
                has_special_tier: true,
            },
        )
        .unwrap();
        assert_eq!(priced.payout_usd, dec!(3.2));
    }

    #[test]
    fn tiered_with_multiple_orders_uses_average_order_value() {
        let table = TierTable {
            revenue: schedule(&[(Some(dec!(100)), dec!(1)), (None, dec!(2))]),
            payout_default: schedule(&[(None, dec!(0.5))]),
            payout_special: None,
        };

        // 4 orders totalling 360: average 90 lands in the first bracket.
        let priced = MetricsCalculator::compute(
            &row(UserSegment::Rtu, 4, dec!(360)),
            PricingTerms::Tiered {
                table: &table,
                has_special_tier: false,
            },
        )
        .unwrap();

        assert_eq!(priced.revenue_usd, dec!(4)); // 1 * 4 orders
        assert_eq!(priced.payout_usd, dec!(2));
    }

    #[test]
    fn tiered_zero_orders_price_at_zero() {
        let table = TierTable {
            revenue: schedule(&[(None, dec!(3))]),
            payout_default: schedule(&[(None, dec!(2))]),
            payout_special: None,
        };

        let priced = MetricsCalculator::compute(
            &row(UserSegment::Rtu, 0, dec!(0)),
            PricingTerms::Tiered {
                table: &table,
                has_special_tier: false,
            },
        )
        .unwrap();

        assert_eq!(priced.revenue_usd, Decimal::ZERO);
        assert_eq!(priced.payout_usd, Decimal::ZERO);
    }

    #[test]
    fn media_buyers_are_paid_their_full_revenue() {
        let mut mb_row = row(UserSegment::Rtu, 4, dec!(800));
        mb_row.partner_type = Some(PartnerType::MediaBuyer);

        let terms = PricingTerms::Rated {
            revenue: RateSpec {
                rate_type: RateType::Percent,
                rate: dec!(5),
                fixed_bonus: Decimal::ZERO,
            },
            payout: RateSpec {
                rate_type: RateType::Percent,
                rate: dec!(50),
                fixed_bonus: Decimal::ZERO,
            },
            exchange_rate: dec!(0.27),
        };

        let priced = MetricsCalculator::compute(&mb_row, terms).unwrap();

        assert_eq!(priced.payout, priced.revenue);
        assert_eq!(priced.profit, Decimal::ZERO);
        assert_eq!(priced.profit_usd, Decimal::ZERO);
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let terms = PricingTerms::Rated {
            revenue: RateSpec::zero(),
            payout: RateSpec::zero(),
            exchange_rate: Decimal::ONE,
        };

        assert!(MetricsCalculator::compute(&row(UserSegment::Ftu, -1, dec!(10)), terms).is_err());
        assert!(MetricsCalculator::compute(&row(UserSegment::Ftu, 1, dec!(-10)), terms).is_err());
    }

    #[test]
    fn zero_rates_produce_zero_money_not_errors() {
        let terms = PricingTerms::Rated {
            revenue: RateSpec::zero(),
            payout: RateSpec::zero(),
            exchange_rate: dec!(0.27),
        };

        let priced =
            MetricsCalculator::compute(&row(UserSegment::Ftu, 2, dec!(100)), terms).unwrap();
        assert_eq!(priced.revenue, Decimal::ZERO);
        assert_eq!(priced.payout, Decimal::ZERO);
        assert_eq!(priced.profit, Decimal::ZERO);
    }
}
