use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::UserSegment;

/// Whether a rate is a percentage (of sales or revenue) or a fixed
/// per-order amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateType {
    Percent,
    Fixed,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Percent => "percent",
            RateType::Fixed => "fixed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "percent" => Some(RateType::Percent),
            "fixed" => Some(RateType::Fixed),
            _ => None,
        }
    }
}

/// A fully resolved rate for one transaction row and segment.
///
/// Percentages are expressed 0-100; the calculator divides by 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSpec {
    pub rate_type: RateType,
    pub rate: Decimal,
    pub fixed_bonus: Decimal,
}

impl RateSpec {
    /// The terminal fallback: no rule at any level resolves to a zero
    /// percentage, which is a valid outcome, not an error.
    pub fn zero() -> Self {
        Self {
            rate_type: RateType::Percent,
            rate: Decimal::ZERO,
            fixed_bonus: Decimal::ZERO,
        }
    }
}

/// One effective-dated version of an advertiser's revenue terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueRule {
    pub id: String,
    pub advertiser_id: String,
    pub effective_at: NaiveDateTime,
    pub rate_type: RateType,
    pub ftu_rate: Option<Decimal>,
    pub rtu_rate: Option<Decimal>,
    pub ftu_fixed_bonus: Option<Decimal>,
    pub rtu_fixed_bonus: Option<Decimal>,
    pub currency: String,
    pub exchange_rate: Option<Decimal>,
    pub created_at: NaiveDateTime,
}

impl RevenueRule {
    pub fn rate_for(&self, segment: UserSegment) -> Decimal {
        match segment {
            UserSegment::Ftu => self.ftu_rate.unwrap_or(Decimal::ZERO),
            UserSegment::Rtu => self.rtu_rate.unwrap_or(Decimal::ZERO),
        }
    }

    pub fn bonus_for(&self, segment: UserSegment) -> Decimal {
        match segment {
            UserSegment::Ftu => self.ftu_fixed_bonus.unwrap_or(Decimal::ZERO),
            UserSegment::Rtu => self.rtu_fixed_bonus.unwrap_or(Decimal::ZERO),
        }
    }

    pub fn rate_spec(&self, segment: UserSegment) -> RateSpec {
        RateSpec {
            rate_type: self.rate_type,
            rate: self.rate_for(segment),
            fixed_bonus: self.bonus_for(segment),
        }
    }
}

/// One effective-dated version of the payout terms for an
/// (advertiser, partner) pair. `partner_id == None` is the advertiser-wide
/// default rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRule {
    pub id: String,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub effective_at: NaiveDateTime,
    pub rate_type: RateType,
    pub ftu_rate: Option<Decimal>,
    pub rtu_rate: Option<Decimal>,
    pub ftu_fixed_bonus: Option<Decimal>,
    pub rtu_fixed_bonus: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl PayoutRule {
    pub fn rate_for(&self, segment: UserSegment) -> Decimal {
        match segment {
            UserSegment::Ftu => self.ftu_rate.unwrap_or(Decimal::ZERO),
            UserSegment::Rtu => self.rtu_rate.unwrap_or(Decimal::ZERO),
        }
    }

    pub fn bonus_for(&self, segment: UserSegment) -> Decimal {
        match segment {
            UserSegment::Ftu => self.ftu_fixed_bonus.unwrap_or(Decimal::ZERO),
            UserSegment::Rtu => self.rtu_fixed_bonus.unwrap_or(Decimal::ZERO),
        }
    }

    pub fn rate_spec(&self, segment: UserSegment) -> RateSpec {
        RateSpec {
            rate_type: self.rate_type,
            rate: self.rate_for(segment),
            fixed_bonus: self.bonus_for(segment),
        }
    }

    /// A rule with either bound set is only valid inside its date range.
    pub fn is_dated(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        let after_start = self.start_date.map(|s| date >= s).unwrap_or(true);
        let before_end = self.end_date.map(|e| date <= e).unwrap_or(true);
        after_start && before_end
    }
}

/// Input model for appending a revenue rule version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRevenueRule {
    pub advertiser_id: String,
    pub effective_at: NaiveDateTime,
    pub rate_type: RateType,
    pub ftu_rate: Option<Decimal>,
    pub rtu_rate: Option<Decimal>,
    pub ftu_fixed_bonus: Option<Decimal>,
    pub rtu_fixed_bonus: Option<Decimal>,
    pub currency: String,
    pub exchange_rate: Option<Decimal>,
}

/// Input model for appending a payout rule version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayoutRule {
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub effective_at: NaiveDateTime,
    pub rate_type: RateType,
    pub ftu_rate: Option<Decimal>,
    pub rtu_rate: Option<Decimal>,
    pub ftu_fixed_bonus: Option<Decimal>,
    pub rtu_fixed_bonus: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Database model for revenue rule versions
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::revenue_rules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RevenueRuleDB {
    pub id: String,
    pub advertiser_id: String,
    pub effective_at: NaiveDateTime,
    pub rate_type: String,
    pub ftu_rate: Option<f64>,
    pub rtu_rate: Option<f64>,
    pub ftu_fixed_bonus: Option<f64>,
    pub rtu_fixed_bonus: Option<f64>,
    pub currency: String,
    pub exchange_rate: Option<f64>,
    pub created_at: NaiveDateTime,
}

/// Database model for payout rule versions
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::payout_rules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PayoutRuleDB {
    pub id: String,
    pub advertiser_id: String,
    pub partner_id: Option<String>,
    pub effective_at: NaiveDateTime,
    pub rate_type: String,
    pub ftu_rate: Option<f64>,
    pub rtu_rate: Option<f64>,
    pub ftu_fixed_bonus: Option<f64>,
    pub rtu_fixed_bonus: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

fn parse_rate_type(value: &str, rule_id: &str) -> RateType {
    RateType::parse(value).unwrap_or_else(|| {
        log::warn!("Unknown rate type '{}' on rule {}, assuming percent", value, rule_id);
        RateType::Percent
    })
}

impl From<RevenueRuleDB> for RevenueRule {
    fn from(db: RevenueRuleDB) -> Self {
        let rate_type = parse_rate_type(&db.rate_type, &db.id);
        Self {
            id: db.id,
            advertiser_id: db.advertiser_id,
            effective_at: db.effective_at,
            rate_type,
            ftu_rate: db.ftu_rate.and_then(Decimal::from_f64),
            rtu_rate: db.rtu_rate.and_then(Decimal::from_f64),
            ftu_fixed_bonus: db.ftu_fixed_bonus.and_then(Decimal::from_f64),
            rtu_fixed_bonus: db.rtu_fixed_bonus.and_then(Decimal::from_f64),
            currency: db.currency,
            exchange_rate: db.exchange_rate.and_then(Decimal::from_f64),
            created_at: db.created_at,
        }
    }
}

impl From<PayoutRuleDB> for PayoutRule {
    fn from(db: PayoutRuleDB) -> Self {
        let rate_type = parse_rate_type(&db.rate_type, &db.id);
        Self {
            id: db.id,
            advertiser_id: db.advertiser_id,
            partner_id: db.partner_id,
            effective_at: db.effective_at,
            rate_type,
            ftu_rate: db.ftu_rate.and_then(Decimal::from_f64),
            rtu_rate: db.rtu_rate.and_then(Decimal::from_f64),
            ftu_fixed_bonus: db.ftu_fixed_bonus.and_then(Decimal::from_f64),
            rtu_fixed_bonus: db.rtu_fixed_bonus.and_then(Decimal::from_f64),
            start_date: db.start_date,
            end_date: db.end_date,
            created_at: db.created_at,
        }
    }
}

impl From<NewRevenueRule> for RevenueRuleDB {
    fn from(domain: NewRevenueRule) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            advertiser_id: domain.advertiser_id,
            effective_at: domain.effective_at,
            rate_type: domain.rate_type.as_str().to_string(),
            ftu_rate: domain.ftu_rate.and_then(|d| d.to_f64()),
            rtu_rate: domain.rtu_rate.and_then(|d| d.to_f64()),
            ftu_fixed_bonus: domain.ftu_fixed_bonus.and_then(|d| d.to_f64()),
            rtu_fixed_bonus: domain.rtu_fixed_bonus.and_then(|d| d.to_f64()),
            currency: domain.currency,
            exchange_rate: domain.exchange_rate.and_then(|d| d.to_f64()),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl From<NewPayoutRule> for PayoutRuleDB {
    fn from(domain: NewPayoutRule) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            advertiser_id: domain.advertiser_id,
            partner_id: domain.partner_id,
            effective_at: domain.effective_at,
            rate_type: domain.rate_type.as_str().to_string(),
            ftu_rate: domain.ftu_rate.and_then(|d| d.to_f64()),
            rtu_rate: domain.rtu_rate.and_then(|d| d.to_f64()),
            ftu_fixed_bonus: domain.ftu_fixed_bonus.and_then(|d| d.to_f64()),
            rtu_fixed_bonus: domain.rtu_fixed_bonus.and_then(|d| d.to_f64()),
            start_date: domain.start_date,
            end_date: domain.end_date,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
