use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::partners::PartnerType;
use crate::rules::RateType;

/// Whether the buyer is a first-time or returning user. Rates are
/// configured per segment throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserSegment {
    #[serde(rename = "FTU")]
    Ftu,
    #[serde(rename = "RTU")]
    Rtu,
}

impl UserSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserSegment::Ftu => "FTU",
            UserSegment::Rtu => "RTU",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "FTU" | "NEW" => Some(UserSegment::Ftu),
            "RTU" | "RETURNING" => Some(UserSegment::Rtu),
            _ => None,
        }
    }
}

/// A normalized transaction row, attributed but not yet priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    pub external_id: Option<String>,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub partner_type: Option<PartnerType>,
    pub coupon_code: Option<String>,
    pub geo: Option<String>,
    pub order_at: NaiveDateTime,
    pub user_segment: UserSegment,
    pub orders: i32,
    pub sales: Decimal,
    pub currency: String,
}

/// A transaction row with revenue, payout and profit computed, in both the
/// advertiser's currency and USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedRow {
    pub id: String,
    pub external_id: Option<String>,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub partner_type: Option<PartnerType>,
    pub coupon_code: Option<String>,
    pub geo: Option<String>,
    pub order_at: NaiveDateTime,
    pub order_date: NaiveDate,
    pub user_segment: UserSegment,
    pub orders: i32,
    pub sales: Decimal,
    pub currency: String,
    /// The payout rate that was applied, kept for auditability.
    pub rate_type: RateType,
    pub rate_value: Decimal,
    pub fixed_bonus: Decimal,
    pub revenue: Decimal,
    pub payout: Decimal,
    pub profit: Decimal,
    pub revenue_usd: Decimal,
    pub payout_usd: Decimal,
    pub profit_usd: Decimal,
    pub created_at: NaiveDateTime,
}

/// Database model for priced transaction rows
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PricedRowDB {
    pub id: String,
    pub external_id: Option<String>,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub partner_type: Option<String>,
    pub coupon_code: Option<String>,
    pub geo: Option<String>,
    pub order_at: NaiveDateTime,
    pub order_date: NaiveDate,
    pub user_segment: String,
    pub orders: i32,
    pub sales: f64,
    pub currency: String,
    pub rate_type: String,
    pub rate_value: f64,
    pub fixed_bonus: f64,
    pub revenue: f64,
    pub payout: f64,
    pub profit: f64,
    pub revenue_usd: f64,
    pub payout_usd: f64,
    pub profit_usd: f64,
    pub created_at: NaiveDateTime,
}

/// Database model for raw feed snapshots
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::raw_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RawSnapshotDB {
    pub id: String,
    pub advertiser_id: String,
    pub source: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub payload: String,
    pub fetched_at: NaiveDateTime,
}

fn decimal_or_zero(value: f64, field: &str, row_id: &str) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        log::warn!("Non-finite {} value {} on transaction {}", field, value, row_id);
        Decimal::ZERO
    })
}

impl From<PricedRowDB> for PricedRow {
    fn from(db: PricedRowDB) -> Self {
        let user_segment = UserSegment::parse(&db.user_segment).unwrap_or_else(|| {
            log::warn!(
                "Unknown user segment '{}' on transaction {}, assuming RTU",
                db.user_segment,
                db.id
            );
            UserSegment::Rtu
        });
        let rate_type = RateType::parse(&db.rate_type).unwrap_or_else(|| {
            log::warn!(
                "Unknown rate type '{}' on transaction {}, assuming percent",
                db.rate_type,
                db.id
            );
            RateType::Percent
        });
        let partner_type = db.partner_type.as_deref().and_then(PartnerType::parse);

        Self {
            sales: decimal_or_zero(db.sales, "sales", &db.id),
            rate_value: decimal_or_zero(db.rate_value, "rate_value", &db.id),
            fixed_bonus: decimal_or_zero(db.fixed_bonus, "fixed_bonus", &db.id),
            revenue: decimal_or_zero(db.revenue, "revenue", &db.id),
            payout: decimal_or_zero(db.payout, "payout", &db.id),
            profit: decimal_or_zero(db.profit, "profit", &db.id),
            revenue_usd: decimal_or_zero(db.revenue_usd, "revenue_usd", &db.id),
            payout_usd: decimal_or_zero(db.payout_usd, "payout_usd", &db.id),
            profit_usd: decimal_or_zero(db.profit_usd, "profit_usd", &db.id),
            id: db.id,
            external_id: db.external_id,
            advertiser_id: db.advertiser_id,
            partner_id: db.partner_id,
            partner_type,
            coupon_code: db.coupon_code,
            geo: db.geo,
            order_at: db.order_at,
            order_date: db.order_date,
            user_segment,
            orders: db.orders,
            currency: db.currency,
            rate_type,
            created_at: db.created_at,
        }
    }
}

impl From<&PricedRow> for PricedRowDB {
    fn from(row: &PricedRow) -> Self {
        Self {
            id: row.id.clone(),
            external_id: row.external_id.clone(),
            advertiser_id: row.advertiser_id.clone(),
            partner_id: row.partner_id.clone(),
            partner_type: row.partner_type.map(|t| t.as_str().to_string()),
            coupon_code: row.coupon_code.clone(),
            geo: row.geo.clone(),
            order_at: row.order_at,
            order_date: row.order_date,
            user_segment: row.user_segment.as_str().to_string(),
            orders: row.orders,
            sales: row.sales.to_f64().unwrap_or(0.0),
            currency: row.currency.clone(),
            rate_type: row.rate_type.as_str().to_string(),
            rate_value: row.rate_value.to_f64().unwrap_or(0.0),
            fixed_bonus: row.fixed_bonus.to_f64().unwrap_or(0.0),
            revenue: row.revenue.to_f64().unwrap_or(0.0),
            payout: row.payout.to_f64().unwrap_or(0.0),
            profit: row.profit.to_f64().unwrap_or(0.0),
            revenue_usd: row.revenue_usd.to_f64().unwrap_or(0.0),
            payout_usd: row.payout_usd.to_f64().unwrap_or(0.0),
            profit_usd: row.profit_usd.to_f64().unwrap_or(0.0),
            created_at: row.created_at,
        }
    }
}
