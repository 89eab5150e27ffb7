use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::partners_errors::{PartnerError, Result};

/// How a partner is paid. Media buyers are special-cased throughout the
/// calculator: their payout equals revenue and their profit is zero, because
/// actual media spend is reconciled by a separate cost-tracking system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartnerType {
    #[serde(rename = "AFF")]
    Affiliate,
    #[serde(rename = "INF")]
    Influencer,
    #[serde(rename = "MB")]
    MediaBuyer,
}

impl PartnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerType::Affiliate => "AFF",
            PartnerType::Influencer => "INF",
            PartnerType::MediaBuyer => "MB",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AFF" => Some(PartnerType::Affiliate),
            "INF" => Some(PartnerType::Influencer),
            "MB" => Some(PartnerType::MediaBuyer),
            _ => None,
        }
    }

    pub fn is_media_buyer(&self) -> bool {
        matches!(self, PartnerType::MediaBuyer)
    }
}

/// Domain model for a referring partner (affiliate, influencer or media buyer)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub partner_type: PartnerType,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new partner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub partner_type: PartnerType,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewPartner {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PartnerError::InvalidData(
                "Partner name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for partners
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::partners)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PartnerDB {
    pub id: String,
    pub name: String,
    pub partner_type: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PartnerDB> for Partner {
    fn from(db: PartnerDB) -> Self {
        let partner_type = PartnerType::parse(&db.partner_type).unwrap_or_else(|| {
            log::warn!(
                "Unknown partner type '{}' for partner {}, assuming affiliate",
                db.partner_type,
                db.id
            );
            PartnerType::Affiliate
        });

        Self {
            id: db.id,
            name: db.name,
            partner_type,
            email: db.email,
            phone: db.phone,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewPartner> for PartnerDB {
    fn from(domain: NewPartner) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            partner_type: domain.partner_type.as_str().to_string(),
            email: domain.email,
            phone: domain.phone,
            created_at: now,
            updated_at: now,
        }
    }
}
