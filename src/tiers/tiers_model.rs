use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use super::tiers_errors::{Result, TierError};

/// Region key that matches any geo when no exact entry exists.
pub const ANY_REGION: &str = "*";

/// One bracket of a tier schedule. `upper == None` marks the open-ended
/// final bracket.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TierBracket {
    pub upper: Option<Decimal>,
    pub amount: Decimal,
}

/// An ordered list of brackets mapping an average order value to a flat
/// per-order amount.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<TierBracket>")]
pub struct TierSchedule {
    brackets: Vec<TierBracket>,
}

impl TierSchedule {
    /// Brackets must be non-empty, strictly ascending by upper bound and
    /// terminated by a single open-ended bracket. A malformed schedule is a
    /// configuration fault, not something to paper over at lookup time.
    pub fn new(brackets: Vec<TierBracket>) -> Result<Self> {
        let Some((last, bounded)) = brackets.split_last() else {
            return Err(TierError::InvalidData(
                "Tier schedule cannot be empty".to_string(),
            ));
        };

        if last.upper.is_some() {
            return Err(TierError::InvalidData(
                "Tier schedule must end with an open-ended bracket".to_string(),
            ));
        }

        let mut previous: Option<Decimal> = None;
        for bracket in bounded {
            let Some(upper) = bracket.upper else {
                return Err(TierError::InvalidData(
                    "Only the final bracket may be open-ended".to_string(),
                ));
            };
            if let Some(prev) = previous {
                if upper <= prev {
                    return Err(TierError::InvalidData(format!(
                        "Tier bounds must be strictly ascending, got {} after {}",
                        upper, prev
                    )));
                }
            }
            previous = Some(upper);
        }

        Ok(Self { brackets })
    }

    /// The amount for the first bracket whose upper bound is at or above
    /// `value`. Values on a boundary belong to the lower bracket.
    pub fn amount_for(&self, value: Decimal) -> Decimal {
        for bracket in &self.brackets {
            match bracket.upper {
                Some(upper) if value <= upper => return bracket.amount,
                Some(_) => continue,
                None => return bracket.amount,
            }
        }
        // Unreachable: new() guarantees a terminal open-ended bracket.
        Decimal::ZERO
    }
}

impl TryFrom<Vec<TierBracket>> for TierSchedule {
    type Error = TierError;

    fn try_from(brackets: Vec<TierBracket>) -> Result<Self> {
        TierSchedule::new(brackets)
    }
}

/// The bracket tables for one (advertiser, region) pair.
///
/// The special payout schedule applies to partners that have a payout rule
/// on file at the transaction timestamp; everyone else gets the default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierTable {
    pub revenue: TierSchedule,
    pub payout_default: TierSchedule,
    pub payout_special: Option<TierSchedule>,
}

impl TierTable {
    pub fn revenue_amount(&self, value: Decimal) -> Decimal {
        self.revenue.amount_for(value)
    }

    pub fn payout_amount(&self, value: Decimal, has_special_tier: bool) -> Decimal {
        let schedule = if has_special_tier {
            self.payout_special.as_ref().unwrap_or(&self.payout_default)
        } else {
            &self.payout_default
        };
        schedule.amount_for(value)
    }
}

/// All tier tables, keyed by advertiser id then region code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TierConfig {
    tables: HashMap<String, HashMap<String, TierTable>>,
}

impl TierConfig {
    pub fn new(tables: HashMap<String, HashMap<String, TierTable>>) -> Self {
        Self { tables }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| TierError::InvalidData(format!("Failed to parse tier config: {}", e)))
    }

    /// The table for an advertiser and geo, falling back to the advertiser's
    /// `*` entry when the geo has no table of its own.
    pub fn table_for(&self, advertiser_id: &str, geo: Option<&str>) -> Option<&TierTable> {
        let regions = self.tables.get(advertiser_id)?;
        geo.and_then(|g| regions.get(g))
            .or_else(|| regions.get(ANY_REGION))
    }

    pub fn has_advertiser(&self, advertiser_id: &str) -> bool {
        self.tables.contains_key(advertiser_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

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
    fn boundary_values_belong_to_the_lower_bracket() {
        let s = schedule(&[
            (Some(dec!(100)), dec!(1)),
            (Some(dec!(200)), dec!(2)),
            (None, dec!(5)),
        ]);

        assert_eq!(s.amount_for(dec!(50)), dec!(1));
        assert_eq!(s.amount_for(dec!(100)), dec!(1));
        assert_eq!(s.amount_for(dec!(101)), dec!(2));
        assert_eq!(s.amount_for(dec!(200)), dec!(2));
        assert_eq!(s.amount_for(dec!(300)), dec!(5));
    }

    #[test]
    fn rejects_unsorted_bounds() {
        let result = TierSchedule::new(vec![
            TierBracket { upper: Some(dec!(200)), amount: dec!(2) },
            TierBracket { upper: Some(dec!(100)), amount: dec!(1) },
            TierBracket { upper: None, amount: dec!(5) },
        ]);
        assert!(matches!(result, Err(TierError::InvalidData(_))));
    }

    #[test]
    fn rejects_missing_terminal_bracket() {
        let result = TierSchedule::new(vec![
            TierBracket { upper: Some(dec!(100)), amount: dec!(1) },
            TierBracket { upper: Some(dec!(200)), amount: dec!(2) },
        ]);
        assert!(matches!(result, Err(TierError::InvalidData(_))));
    }

    #[test]
    fn rejects_empty_schedule() {
        assert!(matches!(
            TierSchedule::new(vec![]),
            Err(TierError::InvalidData(_))
        ));
    }

    #[test]
    fn special_schedule_only_applies_when_flagged() {
        let table = TierTable {
            revenue: schedule(&[(None, dec!(3))]),
            payout_default: schedule(&[(None, dec!(2))]),
            payout_special: Some(schedule(&[(None, dec!(4))])),
        };

        assert_eq!(table.payout_amount(dec!(150), false), dec!(2));
        assert_eq!(table.payout_amount(dec!(150), true), dec!(4));
    }

    #[test]
    fn special_flag_falls_back_to_default_schedule_when_absent() {
        let table = TierTable {
            revenue: schedule(&[(None, dec!(3))]),
            payout_default: schedule(&[(None, dec!(2))]),
            payout_special: None,
        };
        assert_eq!(table.payout_amount(dec!(150), true), dec!(2));
    }

    #[test]
    fn config_falls_back_to_wildcard_region() {
        let raw = r#"{
            "adv": {
                "AE": {
                    "revenue": [{"upper": null, "amount": 3.5}],
                    "payoutDefault": [{"upper": null, "amount": 2.8}],
                    "payoutSpecial": null
                },
                "*": {
                    "revenue": [{"upper": null, "amount": 3.0}],
                    "payoutDefault": [{"upper": null, "amount": 2.0}],
                    "payoutSpecial": null
                }
            }
        }"#;
        let config = TierConfig::from_json(raw).unwrap();

        let ae = config.table_for("adv", Some("AE")).unwrap();
        assert_eq!(ae.revenue_amount(dec!(100)), dec!(3.5));

        let sa = config.table_for("adv", Some("SA")).unwrap();
        assert_eq!(sa.revenue_amount(dec!(100)), dec!(3.0));

        let unattributed = config.table_for("adv", None).unwrap();
        assert_eq!(unattributed.revenue_amount(dec!(100)), dec!(3.0));

        assert!(config.table_for("other", Some("AE")).is_none());
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let raw = r#"{
            "adv": {
                "*": {
                    "revenue": [{"upper": 200, "amount": 2}, {"upper": 100, "amount": 1}, {"upper": null, "amount": 5}],
                    "payoutDefault": [{"upper": null, "amount": 2}],
                    "payoutSpecial": null
                }
            }
        }"#;
        assert!(TierConfig::from_json(raw).is_err());
    }
}
