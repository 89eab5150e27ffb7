use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::schema::{payout_rules, revenue_rules};

use super::rules_errors::{Result, RuleError};
use super::rules_model::{
    NewPayoutRule, NewRevenueRule, PayoutRule, PayoutRuleDB, RevenueRule, RevenueRuleDB,
};
use super::rules_traits::RuleStoreTrait;

/// Repository holding the append-only rate rule history.
pub struct RuleRepository {
    pool: Arc<DbPool>,
}

impl RuleRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

/// Picks the rule version with the greatest effective timestamp out of the
/// already date-filtered candidates. Effective-timestamp ties are a
/// data-model violation; the most recently inserted version wins and the
/// ambiguity is surfaced as a warning.
pub(crate) fn latest_revenue_rule(mut candidates: Vec<RevenueRule>) -> Option<RevenueRule> {
    candidates.sort_by(|a, b| {
        b.effective_at
            .cmp(&a.effective_at)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });

    if candidates.len() > 1 && candidates[0].effective_at == candidates[1].effective_at {
        log::warn!(
            "Duplicate effective timestamp {} on revenue rules for advertiser {}; using most recent version {}",
            candidates[0].effective_at,
            candidates[0].advertiser_id,
            candidates[0].id
        );
    }

    candidates.into_iter().next()
}

/// Same tie-break as `latest_revenue_rule`, with the payout-specific twist
/// that date-range bounded rules covering `as_of` take precedence over
/// undated ones.
pub(crate) fn select_payout_rule(
    candidates: Vec<PayoutRule>,
    as_of: NaiveDateTime,
) -> Option<PayoutRule> {
    let as_of_date = as_of.date();
    let (dated, undated): (Vec<PayoutRule>, Vec<PayoutRule>) =
        candidates.into_iter().partition(|r| r.is_dated());

    let mut pool: Vec<PayoutRule> = dated.into_iter().filter(|r| r.covers(as_of_date)).collect();
    if pool.is_empty() {
        pool = undated;
    }

    pool.sort_by(|a, b| {
        b.effective_at
            .cmp(&a.effective_at)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });

    if pool.len() > 1 && pool[0].effective_at == pool[1].effective_at {
        log::warn!(
            "Duplicate effective timestamp {} on payout rules for advertiser {} / partner {:?}; using most recent version {}",
            pool[0].effective_at,
            pool[0].advertiser_id,
            pool[0].partner_id,
            pool[0].id
        );
    }

    pool.into_iter().next()
}

impl RuleStoreTrait for RuleRepository {
    fn create_revenue_rule(&self, new_rule: NewRevenueRule) -> Result<RevenueRule> {
        let rule_db: RevenueRuleDB = new_rule.into();

        let mut conn =
            get_connection(&self.pool).map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        diesel::insert_into(revenue_rules::table)
            .values(&rule_db)
            .execute(&mut conn)
            .map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        Ok(rule_db.into())
    }

    fn create_payout_rule(&self, new_rule: NewPayoutRule) -> Result<PayoutRule> {
        let rule_db: PayoutRuleDB = new_rule.into();

        let mut conn =
            get_connection(&self.pool).map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        diesel::insert_into(payout_rules::table)
            .values(&rule_db)
            .execute(&mut conn)
            .map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        Ok(rule_db.into())
    }

    fn resolve_revenue_rule(
        &self,
        advertiser_id: &str,
        as_of: NaiveDateTime,
    ) -> Result<Option<RevenueRule>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        let candidates = revenue_rules::table
            .filter(revenue_rules::advertiser_id.eq(advertiser_id))
            .filter(revenue_rules::effective_at.le(as_of))
            .load::<RevenueRuleDB>(&mut conn)
            .map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        Ok(latest_revenue_rule(
            candidates.into_iter().map(RevenueRule::from).collect(),
        ))
    }

    fn resolve_payout_rule(
        &self,
        advertiser_id: &str,
        partner_id: Option<&str>,
        as_of: NaiveDateTime,
    ) -> Result<Option<PayoutRule>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        let mut query = payout_rules::table
            .filter(payout_rules::advertiser_id.eq(advertiser_id))
            .filter(payout_rules::effective_at.le(as_of))
            .into_boxed();

        query = match partner_id {
            Some(p) => query.filter(payout_rules::partner_id.eq(p.to_string())),
            None => query.filter(payout_rules::partner_id.is_null()),
        };

        let candidates = query
            .load::<PayoutRuleDB>(&mut conn)
            .map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        Ok(select_payout_rule(
            candidates.into_iter().map(PayoutRule::from).collect(),
            as_of,
        ))
    }

    fn has_payout_rule(
        &self,
        advertiser_id: &str,
        partner_id: &str,
        as_of: NaiveDateTime,
    ) -> Result<bool> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        let count: i64 = payout_rules::table
            .filter(payout_rules::advertiser_id.eq(advertiser_id))
            .filter(payout_rules::partner_id.eq(partner_id))
            .filter(payout_rules::effective_at.le(as_of))
            .count()
            .get_result(&mut conn)
            .map_err(|e| RuleError::DatabaseError(e.to_string()))?;

        Ok(count > 0)
    }
}
