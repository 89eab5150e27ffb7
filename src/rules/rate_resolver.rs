use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::advertisers::Advertiser;
use crate::transactions::UserSegment;

use super::rules_errors::Result;
use super::rules_model::{RateSpec, RateType};
use super::rules_traits::RuleStoreTrait;

/// The full set of rates that apply to one transaction row once every
/// fallback level has been walked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRates {
    pub revenue: RateSpec,
    pub payout: RateSpec,
    /// USD per one unit of the advertiser's currency.
    pub exchange_rate: Decimal,
}

/// Walks the layered rate configuration for a transaction timestamp.
///
/// Payout resolution falls through three levels before giving up:
/// partner-specific rule, advertiser-wide default rule, then the static
/// defaults on the advertiser record. Revenue has a single level; a missing
/// revenue rule resolves to a zero rate rather than an error so that
/// mid-onboarding advertisers still flow through the pipeline.
pub struct RateResolver {
    rules: Arc<dyn RuleStoreTrait>,
}

impl RateResolver {
    pub fn new(rules: Arc<dyn RuleStoreTrait>) -> Self {
        Self { rules }
    }

    /// Revenue rate and exchange rate effective at `as_of`. The rule's own
    /// exchange rate wins over the advertiser-level one when both exist.
    pub fn resolve_revenue(
        &self,
        advertiser: &Advertiser,
        segment: UserSegment,
        as_of: NaiveDateTime,
    ) -> Result<(RateSpec, Decimal)> {
        let advertiser_fx = advertiser.exchange_rate.unwrap_or(Decimal::ONE);

        match self.rules.resolve_revenue_rule(&advertiser.id, as_of)? {
            Some(rule) => {
                let fx = rule.exchange_rate.unwrap_or(advertiser_fx);
                Ok((rule.rate_spec(segment), fx))
            }
            None => {
                log::warn!(
                    "No revenue rule for advertiser {} at {}, pricing revenue at zero",
                    advertiser.id,
                    as_of
                );
                Ok((RateSpec::zero(), advertiser_fx))
            }
        }
    }

    /// Payout rate effective at `as_of`, walking the fallback chain.
    pub fn resolve_payout(
        &self,
        advertiser: &Advertiser,
        partner_id: Option<&str>,
        segment: UserSegment,
        as_of: NaiveDateTime,
    ) -> Result<RateSpec> {
        if let Some(partner) = partner_id {
            if let Some(rule) = self
                .rules
                .resolve_payout_rule(&advertiser.id, Some(partner), as_of)?
            {
                return Ok(rule.rate_spec(segment));
            }
        }

        if let Some(rule) = self.rules.resolve_payout_rule(&advertiser.id, None, as_of)? {
            return Ok(rule.rate_spec(segment));
        }

        Ok(advertiser_default_spec(advertiser, segment))
    }

    pub fn resolve(
        &self,
        advertiser: &Advertiser,
        partner_id: Option<&str>,
        segment: UserSegment,
        as_of: NaiveDateTime,
    ) -> Result<ResolvedRates> {
        let (revenue, exchange_rate) = self.resolve_revenue(advertiser, segment, as_of)?;
        let payout = self.resolve_payout(advertiser, partner_id, segment, as_of)?;

        Ok(ResolvedRates {
            revenue,
            payout,
            exchange_rate,
        })
    }

    /// Under the tiered pricing model the mere existence of a partner
    /// payout rule at the transaction timestamp selects the special bracket
    /// table; the rule's values are not read.
    pub fn has_special_tier(
        &self,
        advertiser_id: &str,
        partner_id: Option<&str>,
        as_of: NaiveDateTime,
    ) -> Result<bool> {
        match partner_id {
            Some(partner) => self.rules.has_payout_rule(advertiser_id, partner, as_of),
            None => Ok(false),
        }
    }
}

/// Last fallback level: the static default payout fields on the advertiser
/// record. Absent fields read as zero, which makes a fully unconfigured
/// advertiser resolve to a zero percentage.
fn advertiser_default_spec(advertiser: &Advertiser, segment: UserSegment) -> RateSpec {
    let rate_type = RateType::parse(&advertiser.default_payout_rate_type).unwrap_or_else(|| {
        log::warn!(
            "Unknown default payout rate type '{}' on advertiser {}, assuming percent",
            advertiser.default_payout_rate_type,
            advertiser.id
        );
        RateType::Percent
    });

    let (rate, fixed_bonus) = match segment {
        UserSegment::Ftu => (
            advertiser.default_ftu_payout,
            advertiser.default_ftu_fixed_bonus,
        ),
        UserSegment::Rtu => (
            advertiser.default_rtu_payout,
            advertiser.default_rtu_fixed_bonus,
        ),
    };

    RateSpec {
        rate_type,
        rate: rate.unwrap_or(Decimal::ZERO),
        fixed_bonus: fixed_bonus.unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advertisers::PricingModel;
    use crate::rules::rules_errors::Result as RuleResult;
    use crate::rules::rules_model::{
        NewPayoutRule, NewRevenueRule, PayoutRule, RevenueRule,
    };
    use crate::rules::rules_repository::{latest_revenue_rule, select_payout_rule};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    /// In-memory rule store mirroring the repository's selection logic.
    struct StubRuleStore {
        revenue: Vec<RevenueRule>,
        payout: Vec<PayoutRule>,
    }

    impl RuleStoreTrait for StubRuleStore {
        fn create_revenue_rule(&self, _new_rule: NewRevenueRule) -> RuleResult<RevenueRule> {
            unimplemented!("not used by resolver tests")
        }

        fn create_payout_rule(&self, _new_rule: NewPayoutRule) -> RuleResult<PayoutRule> {
            unimplemented!("not used by resolver tests")
        }

        fn resolve_revenue_rule(
            &self,
            advertiser_id: &str,
            as_of: NaiveDateTime,
        ) -> RuleResult<Option<RevenueRule>> {
            let candidates = self
                .revenue
                .iter()
                .filter(|r| r.advertiser_id == advertiser_id && r.effective_at <= as_of)
                .cloned()
                .collect();
            Ok(latest_revenue_rule(candidates))
        }

        fn resolve_payout_rule(
            &self,
            advertiser_id: &str,
            partner_id: Option<&str>,
            as_of: NaiveDateTime,
        ) -> RuleResult<Option<PayoutRule>> {
            let candidates = self
                .payout
                .iter()
                .filter(|r| {
                    r.advertiser_id == advertiser_id
                        && r.partner_id.as_deref() == partner_id
                        && r.effective_at <= as_of
                })
                .cloned()
                .collect();
            Ok(select_payout_rule(candidates, as_of))
        }

        fn has_payout_rule(
            &self,
            advertiser_id: &str,
            partner_id: &str,
            as_of: NaiveDateTime,
        ) -> RuleResult<bool> {
            Ok(self.payout.iter().any(|r| {
                r.advertiser_id == advertiser_id
                    && r.partner_id.as_deref() == Some(partner_id)
                    && r.effective_at <= as_of
            }))
        }
    }

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn advertiser() -> Advertiser {
        Advertiser {
            id: "adv".to_string(),
            name: "Shop".to_string(),
            pricing_model: PricingModel::Percent,
            currency: "AED".to_string(),
            exchange_rate: Some(dec!(0.27)),
            default_payout_rate_type: "percent".to_string(),
            default_ftu_payout: Some(dec!(60)),
            default_rtu_payout: Some(dec!(50)),
            default_ftu_fixed_bonus: None,
            default_rtu_fixed_bonus: None,
            created_at: dt(2025, 1, 1),
            updated_at: dt(2025, 1, 1),
        }
    }

    fn revenue_rule(effective: NaiveDateTime, rtu_rate: Decimal) -> RevenueRule {
        RevenueRule {
            id: uuid::Uuid::new_v4().to_string(),
            advertiser_id: "adv".to_string(),
            effective_at: effective,
            rate_type: RateType::Percent,
            ftu_rate: Some(dec!(7)),
            rtu_rate: Some(rtu_rate),
            ftu_fixed_bonus: None,
            rtu_fixed_bonus: None,
            currency: "AED".to_string(),
            exchange_rate: None,
            created_at: effective,
        }
    }

    fn payout_rule(partner_id: Option<&str>, effective: NaiveDateTime, rtu_rate: Decimal) -> PayoutRule {
        PayoutRule {
            id: uuid::Uuid::new_v4().to_string(),
            advertiser_id: "adv".to_string(),
            partner_id: partner_id.map(str::to_string),
            effective_at: effective,
            rate_type: RateType::Percent,
            ftu_rate: Some(dec!(45)),
            rtu_rate: Some(rtu_rate),
            ftu_fixed_bonus: None,
            rtu_fixed_bonus: None,
            start_date: None,
            end_date: None,
            created_at: effective,
        }
    }

    fn resolver(revenue: Vec<RevenueRule>, payout: Vec<PayoutRule>) -> RateResolver {
        RateResolver::new(Arc::new(StubRuleStore { revenue, payout }))
    }

    #[test]
    fn partner_rule_wins_over_default_rule() {
        let resolver = resolver(
            vec![],
            vec![
                payout_rule(Some("p1"), dt(2025, 1, 1), dec!(35)),
                payout_rule(None, dt(2025, 1, 1), dec!(25)),
            ],
        );

        let spec = resolver
            .resolve_payout(&advertiser(), Some("p1"), UserSegment::Rtu, dt(2025, 2, 1))
            .unwrap();
        assert_eq!(spec.rate, dec!(35));
    }

    #[test]
    fn falls_back_to_default_rule_then_advertiser_defaults() {
        let resolver = resolver(vec![], vec![payout_rule(None, dt(2025, 1, 1), dec!(25))]);

        // No partner rule: the advertiser-wide default rule applies.
        let spec = resolver
            .resolve_payout(&advertiser(), Some("p2"), UserSegment::Rtu, dt(2025, 2, 1))
            .unwrap();
        assert_eq!(spec.rate, dec!(25));

        // No rules at all: the static advertiser defaults apply.
        let resolver = self::resolver(vec![], vec![]);
        let spec = resolver
            .resolve_payout(&advertiser(), Some("p2"), UserSegment::Rtu, dt(2025, 2, 1))
            .unwrap();
        assert_eq!(spec.rate, dec!(50));
    }

    #[test]
    fn unconfigured_advertiser_resolves_to_zero_percent() {
        let mut adv = advertiser();
        adv.default_ftu_payout = None;
        adv.default_rtu_payout = None;

        let resolver = resolver(vec![], vec![]);
        let spec = resolver
            .resolve_payout(&adv, None, UserSegment::Rtu, dt(2025, 2, 1))
            .unwrap();
        assert_eq!(spec, RateSpec::zero());
    }

    #[test]
    fn missing_revenue_rule_prices_at_zero_with_advertiser_fx() {
        let resolver = resolver(vec![], vec![]);
        let (spec, fx) = resolver
            .resolve_revenue(&advertiser(), UserSegment::Ftu, dt(2025, 2, 1))
            .unwrap();
        assert_eq!(spec, RateSpec::zero());
        assert_eq!(fx, dec!(0.27));
    }

    #[test]
    fn rule_exchange_rate_overrides_advertiser_exchange_rate() {
        let mut rule = revenue_rule(dt(2025, 1, 1), dec!(5));
        rule.exchange_rate = Some(dec!(0.26));

        let resolver = resolver(vec![rule], vec![]);
        let (_, fx) = resolver
            .resolve_revenue(&advertiser(), UserSegment::Rtu, dt(2025, 2, 1))
            .unwrap();
        assert_eq!(fx, dec!(0.26));
    }

    #[test]
    fn revenue_resolution_respects_effective_dates() {
        let resolver = resolver(
            vec![
                revenue_rule(dt(2025, 1, 1), dec!(5)),
                revenue_rule(dt(2025, 3, 1), dec!(8)),
            ],
            vec![],
        );

        let (before, _) = resolver
            .resolve_revenue(&advertiser(), UserSegment::Rtu, dt(2025, 2, 15))
            .unwrap();
        assert_eq!(before.rate, dec!(5));

        let (after, _) = resolver
            .resolve_revenue(&advertiser(), UserSegment::Rtu, dt(2025, 3, 15))
            .unwrap();
        assert_eq!(after.rate, dec!(8));
    }

    #[test]
    fn special_tier_flag_pinned_to_transaction_timestamp() {
        let resolver = resolver(vec![], vec![payout_rule(Some("p1"), dt(2025, 3, 1), dec!(30))]);

        // The rule only starts existing on 2025-03-01.
        assert!(!resolver.has_special_tier("adv", Some("p1"), dt(2025, 2, 1)).unwrap());
        assert!(resolver.has_special_tier("adv", Some("p1"), dt(2025, 3, 15)).unwrap());
        // Unattributed rows never get the special table.
        assert!(!resolver.has_special_tier("adv", None, dt(2025, 3, 15)).unwrap());
    }
}
