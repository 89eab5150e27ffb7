use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::advertisers_errors::{AdvertiserError, Result};

/// How an advertiser's orders are priced. Replaces the legacy branching on
/// advertiser name strings with an explicit tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingModel {
    Percent,
    Fixed,
    Tiered,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::Percent => "percent",
            PricingModel::Fixed => "fixed",
            PricingModel::Tiered => "tiered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "percent" => Some(PricingModel::Percent),
            "fixed" => Some(PricingModel::Fixed),
            "tiered" => Some(PricingModel::Tiered),
            _ => None,
        }
    }
}

/// Domain model for an advertiser and its pricing configuration.
///
/// The `default_*` payout fields are the last level of the payout fallback
/// chain: they apply when no payout rule exists for a partner at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertiser {
    pub id: String,
    pub name: String,
    pub pricing_model: PricingModel,
    pub currency: String,
    /// USD per one unit of the advertiser's currency.
    pub exchange_rate: Option<Decimal>,
    pub default_payout_rate_type: String,
    pub default_ftu_payout: Option<Decimal>,
    pub default_rtu_payout: Option<Decimal>,
    pub default_ftu_fixed_bonus: Option<Decimal>,
    pub default_rtu_fixed_bonus: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new advertiser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvertiser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub pricing_model: PricingModel,
    pub currency: String,
    pub exchange_rate: Option<Decimal>,
    pub default_payout_rate_type: String,
    pub default_ftu_payout: Option<Decimal>,
    pub default_rtu_payout: Option<Decimal>,
    pub default_ftu_fixed_bonus: Option<Decimal>,
    pub default_rtu_fixed_bonus: Option<Decimal>,
}

impl NewAdvertiser {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AdvertiserError::InvalidData(
                "Advertiser name cannot be empty".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(AdvertiserError::InvalidData(
                "Currency cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for advertisers
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::advertisers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AdvertiserDB {
    pub id: String,
    pub name: String,
    pub pricing_model: String,
    pub currency: String,
    pub exchange_rate: Option<f64>,
    pub default_payout_rate_type: String,
    pub default_ftu_payout: Option<f64>,
    pub default_rtu_payout: Option<f64>,
    pub default_ftu_fixed_bonus: Option<f64>,
    pub default_rtu_fixed_bonus: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<AdvertiserDB> for Advertiser {
    fn from(db: AdvertiserDB) -> Self {
        let pricing_model = PricingModel::parse(&db.pricing_model).unwrap_or_else(|| {
            log::warn!(
                "Unknown pricing model '{}' for advertiser {}, assuming percent",
                db.pricing_model,
                db.id
            );
            PricingModel::Percent
        });

        Self {
            id: db.id,
            name: db.name,
            pricing_model,
            currency: db.currency,
            exchange_rate: db.exchange_rate.and_then(Decimal::from_f64),
            default_payout_rate_type: db.default_payout_rate_type,
            default_ftu_payout: db.default_ftu_payout.and_then(Decimal::from_f64),
            default_rtu_payout: db.default_rtu_payout.and_then(Decimal::from_f64),
            default_ftu_fixed_bonus: db.default_ftu_fixed_bonus.and_then(Decimal::from_f64),
            default_rtu_fixed_bonus: db.default_rtu_fixed_bonus.and_then(Decimal::from_f64),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAdvertiser> for AdvertiserDB {
    fn from(domain: NewAdvertiser) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            pricing_model: domain.pricing_model.as_str().to_string(),
            currency: domain.currency,
            exchange_rate: domain.exchange_rate.and_then(|d| d.to_f64()),
            default_payout_rate_type: domain.default_payout_rate_type,
            default_ftu_payout: domain.default_ftu_payout.and_then(|d| d.to_f64()),
            default_rtu_payout: domain.default_rtu_payout.and_then(|d| d.to_f64()),
            default_ftu_fixed_bonus: domain.default_ftu_fixed_bonus.and_then(|d| d.to_f64()),
            default_rtu_fixed_bonus: domain.default_rtu_fixed_bonus.and_then(|d| d.to_f64()),
            created_at: now,
            updated_at: now,
        }
    }
}
