use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::UserSegment;

/// One order record as delivered by an upstream feed, before any cleaning.
///
/// Feeds disagree on types: numbers arrive as strings with thousands
/// separators, dates in several formats, segments under different labels.
/// Everything questionable stays loosely typed here and is validated by
/// `normalize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderRecord {
    #[serde(default)]
    pub external_id: Option<String>,
    pub order_date: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub user_segment: String,
    pub orders: serde_json::Value,
    pub sales: serde_json::Value,
    #[serde(default)]
    pub geo: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A raw record after type cleaning, not yet attributed to a partner.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub external_id: Option<String>,
    pub coupon_code: Option<String>,
    pub geo: Option<String>,
    pub order_at: NaiveDateTime,
    pub user_segment: UserSegment,
    pub orders: i32,
    pub sales: Decimal,
    pub currency: Option<String>,
}

/// Counters reported back from one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSummary {
    /// Rows priced and stored.
    pub processed: usize,
    /// Malformed rows dropped during normalization.
    pub skipped: usize,
    /// Rows that failed pricing.
    pub errored: usize,
}

/// Cleans one raw record. The error string names the offending field so a
/// run's skip log is actionable.
pub fn normalize(record: &RawOrderRecord) -> std::result::Result<NormalizedRecord, String> {
    let order_at = parse_order_timestamp(&record.order_date)
        .ok_or_else(|| format!("unparseable order date '{}'", record.order_date))?;

    let user_segment = UserSegment::parse(&record.user_segment)
        .ok_or_else(|| format!("unknown user segment '{}'", record.user_segment))?;

    let orders = parse_count(&record.orders)
        .ok_or_else(|| format!("unparseable order count '{}'", record.orders))?;
    if orders < 0 {
        return Err(format!("negative order count '{}'", orders));
    }

    let sales = parse_amount(&record.sales)
        .ok_or_else(|| format!("unparseable sales amount '{}'", record.sales))?;
    if sales < Decimal::ZERO {
        return Err(format!("negative sales amount '{}'", sales));
    }

    Ok(NormalizedRecord {
        external_id: record.external_id.clone(),
        coupon_code: record
            .coupon_code
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty()),
        geo: record
            .geo
            .as_deref()
            .map(|g| g.trim().to_uppercase())
            .filter(|g| !g.is_empty()),
        order_at,
        user_segment,
        orders,
        sales,
        currency: record
            .currency
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty()),
    })
}

/// Feeds deliver timestamps in a handful of formats; date-only values are
/// pinned to midnight.
pub fn parse_order_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

fn parse_count(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn parse_amount(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        serde_json::Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record() -> RawOrderRecord {
        RawOrderRecord {
            external_id: Some("ord-1".to_string()),
            order_date: "2025-04-10 09:30:00".to_string(),
            coupon_code: Some(" save10 ".to_string()),
            user_segment: "FTU".to_string(),
            orders: json!(2),
            sales: json!("1,250.50"),
            geo: Some("ae".to_string()),
            currency: Some("aed".to_string()),
        }
    }

    #[test]
    fn normalizes_a_messy_but_valid_record() {
        let normalized = normalize(&record()).unwrap();

        assert_eq!(normalized.coupon_code.as_deref(), Some("SAVE10"));
        assert_eq!(normalized.geo.as_deref(), Some("AE"));
        assert_eq!(normalized.currency.as_deref(), Some("AED"));
        assert_eq!(normalized.user_segment, UserSegment::Ftu);
        assert_eq!(normalized.orders, 2);
        assert_eq!(normalized.sales, dec!(1250.50));
        assert_eq!(
            normalized.order_at,
            NaiveDate::from_ymd_opt(2025, 4, 10)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn accepts_the_known_date_formats() {
        for raw in [
            "2025-04-10T09:30:00",
            "2025-04-10T09:30:00.123",
            "2025-04-10 09:30:00",
            "2025-04-10",
            "10/04/2025",
            "10-04-2025",
        ] {
            let parsed = parse_order_timestamp(raw);
            assert!(parsed.is_some(), "failed to parse '{}'", raw);
            assert_eq!(
                parsed.unwrap().date(),
                NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
            );
        }
        assert!(parse_order_timestamp("April 10th").is_none());
    }

    #[test]
    fn string_and_numeric_counts_both_parse() {
        let mut r = record();
        r.orders = json!("3");
        assert_eq!(normalize(&r).unwrap().orders, 3);

        r.orders = json!(5);
        assert_eq!(normalize(&r).unwrap().orders, 5);
    }

    #[test]
    fn segment_synonyms_map_to_the_canonical_values() {
        let mut r = record();
        for (label, expected) in [
            ("new", UserSegment::Ftu),
            ("RETURNING", UserSegment::Rtu),
            ("rtu", UserSegment::Rtu),
        ] {
            r.user_segment = label.to_string();
            assert_eq!(normalize(&r).unwrap().user_segment, expected);
        }
    }

    #[test]
    fn malformed_fields_are_rejected_with_the_field_named() {
        let mut r = record();
        r.order_date = "not a date".to_string();
        assert!(normalize(&r).unwrap_err().contains("order date"));

        let mut r = record();
        r.user_segment = "VIP".to_string();
        assert!(normalize(&r).unwrap_err().contains("user segment"));

        let mut r = record();
        r.orders = json!("two");
        assert!(normalize(&r).unwrap_err().contains("order count"));

        let mut r = record();
        r.sales = json!(null);
        assert!(normalize(&r).unwrap_err().contains("sales amount"));

        let mut r = record();
        r.orders = json!(-1);
        assert!(normalize(&r).unwrap_err().contains("negative order count"));
    }

    #[test]
    fn blank_optional_fields_normalize_to_none() {
        let mut r = record();
        r.coupon_code = Some("  ".to_string());
        r.geo = None;
        r.currency = Some("".to_string());

        let normalized = normalize(&r).unwrap();
        assert!(normalized.coupon_code.is_none());
        assert!(normalized.geo.is_none());
        assert!(normalized.currency.is_none());
    }
}
