use chrono::NaiveDateTime;

use super::rules_errors::Result;
use super::rules_model::{NewPayoutRule, NewRevenueRule, PayoutRule, RevenueRule};

/// Trait defining the contract for the date-versioned rule store.
pub trait RuleStoreTrait: Send + Sync {
    fn create_revenue_rule(&self, new_rule: NewRevenueRule) -> Result<RevenueRule>;
    fn create_payout_rule(&self, new_rule: NewPayoutRule) -> Result<PayoutRule>;
    /// Latest revenue rule version effective at or before `as_of`.
    fn resolve_revenue_rule(
        &self,
        advertiser_id: &str,
        as_of: NaiveDateTime,
    ) -> Result<Option<RevenueRule>>;
    /// Latest payout rule version for the given partner scope
    /// (`None` selects the advertiser-wide default rules).
    fn resolve_payout_rule(
        &self,
        advertiser_id: &str,
        partner_id: Option<&str>,
        as_of: NaiveDateTime,
    ) -> Result<Option<PayoutRule>>;
    /// Whether any partner-specific payout rule exists at `as_of`. The
    /// tiered pricing model keys its special bracket table off this flag.
    fn has_payout_rule(
        &self,
        advertiser_id: &str,
        partner_id: &str,
        as_of: NaiveDateTime,
    ) -> Result<bool>;
}
