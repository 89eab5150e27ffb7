use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::MONEY_SCALE;
use crate::transactions::{PricedRow, UserSegment};

/// One day of performance for an (advertiser, partner, coupon, geo)
/// combination, split by user segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRollup {
    pub id: String,
    pub rollup_date: NaiveDate,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub coupon_code: Option<String>,
    pub geo: Option<String>,
    pub ftu_orders: i32,
    pub rtu_orders: i32,
    pub total_orders: i32,
    pub ftu_sales: Decimal,
    pub rtu_sales: Decimal,
    pub total_sales: Decimal,
    pub ftu_revenue_usd: Decimal,
    pub rtu_revenue_usd: Decimal,
    pub total_revenue_usd: Decimal,
    pub ftu_payout_usd: Decimal,
    pub rtu_payout_usd: Decimal,
    pub total_payout_usd: Decimal,
    pub created_at: NaiveDateTime,
}

/// A rollup before it has been persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerformanceRollup {
    pub rollup_date: NaiveDate,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub coupon_code: Option<String>,
    pub geo: Option<String>,
    pub ftu_orders: i32,
    pub rtu_orders: i32,
    pub ftu_sales: Decimal,
    pub rtu_sales: Decimal,
    pub ftu_revenue_usd: Decimal,
    pub rtu_revenue_usd: Decimal,
    pub ftu_payout_usd: Decimal,
    pub rtu_payout_usd: Decimal,
}

impl NewPerformanceRollup {
    pub fn total_orders(&self) -> i32 {
        self.ftu_orders + self.rtu_orders
    }

    pub fn total_sales(&self) -> Decimal {
        self.ftu_sales + self.rtu_sales
    }

    pub fn total_revenue_usd(&self) -> Decimal {
        self.ftu_revenue_usd + self.rtu_revenue_usd
    }

    pub fn total_payout_usd(&self) -> Decimal {
        self.ftu_payout_usd + self.rtu_payout_usd
    }
}

/// Database model for performance rollups
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::performance_rollups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PerformanceRollupDB {
    pub id: String,
    pub rollup_date: NaiveDate,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub coupon_code: Option<String>,
    pub geo: Option<String>,
    pub ftu_orders: i32,
    pub rtu_orders: i32,
    pub total_orders: i32,
    pub ftu_sales: f64,
    pub rtu_sales: f64,
    pub total_sales: f64,
    pub ftu_revenue_usd: f64,
    pub rtu_revenue_usd: f64,
    pub total_revenue_usd: f64,
    pub ftu_payout_usd: f64,
    pub rtu_payout_usd: f64,
    pub total_payout_usd: f64,
    pub created_at: NaiveDateTime,
}

impl From<PerformanceRollupDB> for PerformanceRollup {
    fn from(db: PerformanceRollupDB) -> Self {
        let dec = |v: f64| Decimal::from_f64(v).unwrap_or(Decimal::ZERO);
        Self {
            id: db.id,
            rollup_date: db.rollup_date,
            advertiser_id: db.advertiser_id,
            partner_id: db.partner_id,
            coupon_code: db.coupon_code,
            geo: db.geo,
            ftu_orders: db.ftu_orders,
            rtu_orders: db.rtu_orders,
            total_orders: db.total_orders,
            ftu_sales: dec(db.ftu_sales),
            rtu_sales: dec(db.rtu_sales),
            total_sales: dec(db.total_sales),
            ftu_revenue_usd: dec(db.ftu_revenue_usd),
            rtu_revenue_usd: dec(db.rtu_revenue_usd),
            total_revenue_usd: dec(db.total_revenue_usd),
            ftu_payout_usd: dec(db.ftu_payout_usd),
            rtu_payout_usd: dec(db.rtu_payout_usd),
            total_payout_usd: dec(db.total_payout_usd),
            created_at: db.created_at,
        }
    }
}

impl From<&NewPerformanceRollup> for PerformanceRollupDB {
    fn from(rollup: &NewPerformanceRollup) -> Self {
        let f = |v: Decimal| v.to_f64().unwrap_or(0.0);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rollup_date: rollup.rollup_date,
            advertiser_id: rollup.advertiser_id.clone(),
            partner_id: rollup.partner_id.clone(),
            coupon_code: rollup.coupon_code.clone(),
            geo: rollup.geo.clone(),
            ftu_orders: rollup.ftu_orders,
            rtu_orders: rollup.rtu_orders,
            total_orders: rollup.total_orders(),
            ftu_sales: f(rollup.ftu_sales),
            rtu_sales: f(rollup.rtu_sales),
            total_sales: f(rollup.total_sales()),
            ftu_revenue_usd: f(rollup.ftu_revenue_usd),
            rtu_revenue_usd: f(rollup.rtu_revenue_usd),
            total_revenue_usd: f(rollup.total_revenue_usd()),
            ftu_payout_usd: f(rollup.ftu_payout_usd),
            rtu_payout_usd: f(rollup.rtu_payout_usd),
            total_payout_usd: f(rollup.total_payout_usd()),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Groups priced rows into one rollup per (day, partner, coupon, geo).
///
/// Pure function over its input, so rebuilding a window from the same rows
/// always produces the same rollups. Sales are summed in the advertiser's
/// currency; revenue and payout are summed in USD.
pub fn build_rollups(rows: &[PricedRow]) -> Vec<NewPerformanceRollup> {
    type Key = (NaiveDate, Option<String>, Option<String>, Option<String>);
    let mut groups: BTreeMap<Key, NewPerformanceRollup> = BTreeMap::new();

    for row in rows {
        let key = (
            row.order_date,
            row.partner_id.clone(),
            row.coupon_code.clone(),
            row.geo.clone(),
        );
        let entry = groups.entry(key).or_insert_with(|| NewPerformanceRollup {
            rollup_date: row.order_date,
            advertiser_id: row.advertiser_id.clone(),
            partner_id: row.partner_id.clone(),
            coupon_code: row.coupon_code.clone(),
            geo: row.geo.clone(),
            ..Default::default()
        });

        match row.user_segment {
            UserSegment::Ftu => {
                entry.ftu_orders += row.orders;
                entry.ftu_sales += row.sales;
                entry.ftu_revenue_usd += row.revenue_usd;
                entry.ftu_payout_usd += row.payout_usd;
            }
            UserSegment::Rtu => {
                entry.rtu_orders += row.orders;
                entry.rtu_sales += row.sales;
                entry.rtu_revenue_usd += row.revenue_usd;
                entry.rtu_payout_usd += row.payout_usd;
            }
        }
    }

    groups
        .into_values()
        .map(|mut rollup| {
            rollup.ftu_sales = rollup.ftu_sales.round_dp(MONEY_SCALE);
            rollup.rtu_sales = rollup.rtu_sales.round_dp(MONEY_SCALE);
            rollup.ftu_revenue_usd = rollup.ftu_revenue_usd.round_dp(MONEY_SCALE);
            rollup.rtu_revenue_usd = rollup.rtu_revenue_usd.round_dp(MONEY_SCALE);
            rollup.ftu_payout_usd = rollup.ftu_payout_usd.round_dp(MONEY_SCALE);
            rollup.rtu_payout_usd = rollup.rtu_payout_usd.round_dp(MONEY_SCALE);
            rollup
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RateType;
    use rust_decimal_macros::dec;

    fn priced_row(
        date: NaiveDate,
        partner: Option<&str>,
        segment: UserSegment,
        orders: i32,
        sales: Decimal,
        revenue_usd: Decimal,
        payout_usd: Decimal,
    ) -> PricedRow {
        PricedRow {
            id: uuid::Uuid::new_v4().to_string(),
            external_id: None,
            advertiser_id: "adv".to_string(),
            partner_id: partner.map(str::to_string),
            partner_type: None,
            coupon_code: partner.map(|p| format!("{}-CODE", p.to_uppercase())),
            geo: Some("AE".to_string()),
            order_at: date.and_hms_opt(10, 0, 0).unwrap(),
            order_date: date,
            user_segment: segment,
            orders,
            sales,
            currency: "AED".to_string(),
            rate_type: RateType::Percent,
            rate_value: dec!(50),
            fixed_bonus: Decimal::ZERO,
            revenue: revenue_usd,
            payout: payout_usd,
            profit: revenue_usd - payout_usd,
            revenue_usd,
            payout_usd,
            profit_usd: revenue_usd - payout_usd,
            created_at: date.and_hms_opt(10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn sums_segments_within_a_group() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let rows = vec![
            priced_row(date, Some("p1"), UserSegment::Ftu, 2, dec!(300), dec!(15), dec!(7.5)),
            priced_row(date, Some("p1"), UserSegment::Rtu, 3, dec!(450), dec!(22.5), dec!(11.25)),
            priced_row(date, Some("p1"), UserSegment::Rtu, 1, dec!(150), dec!(7.5), dec!(3.75)),
        ];

        let rollups = build_rollups(&rows);
        assert_eq!(rollups.len(), 1);

        let rollup = &rollups[0];
        assert_eq!(rollup.ftu_orders, 2);
        assert_eq!(rollup.rtu_orders, 4);
        assert_eq!(rollup.total_orders(), 6);
        assert_eq!(rollup.ftu_sales, dec!(300));
        assert_eq!(rollup.rtu_sales, dec!(600));
        assert_eq!(rollup.total_sales(), dec!(900));
        assert_eq!(rollup.total_revenue_usd(), dec!(45));
        assert_eq!(rollup.total_payout_usd(), dec!(22.5));
    }

    #[test]
    fn splits_groups_by_day_and_partner() {
        let day1 = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2025, 4, 11).unwrap();
        let rows = vec![
            priced_row(day1, Some("p1"), UserSegment::Ftu, 1, dec!(100), dec!(5), dec!(2.5)),
            priced_row(day1, Some("p2"), UserSegment::Ftu, 1, dec!(100), dec!(5), dec!(2.5)),
            priced_row(day1, None, UserSegment::Rtu, 1, dec!(100), dec!(5), dec!(2.5)),
            priced_row(day2, Some("p1"), UserSegment::Ftu, 1, dec!(100), dec!(5), dec!(2.5)),
        ];

        let rollups = build_rollups(&rows);
        assert_eq!(rollups.len(), 4);
    }

    #[test]
    fn rebuilding_from_the_same_rows_is_idempotent() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let rows = vec![
            priced_row(date, Some("p1"), UserSegment::Ftu, 2, dec!(300), dec!(15), dec!(7.5)),
            priced_row(date, None, UserSegment::Rtu, 1, dec!(80), dec!(4), dec!(2)),
        ];

        assert_eq!(build_rollups(&rows), build_rollups(&rows));
    }

    #[test]
    fn empty_input_builds_no_rollups() {
        assert!(build_rollups(&[]).is_empty());
    }
}
