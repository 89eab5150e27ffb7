// Module declarations
pub(crate) mod rate_resolver;
pub(crate) mod rules_errors;
pub(crate) mod rules_model;
pub(crate) mod rules_repository;
pub(crate) mod rules_traits;

// Re-export the public interface
pub use rate_resolver::{RateResolver, ResolvedRates};
pub use rules_model::{
    NewPayoutRule, NewRevenueRule, PayoutRule, PayoutRuleDB, RateSpec, RateType, RevenueRule,
    RevenueRuleDB,
};
pub use rules_repository::RuleRepository;
pub use rules_traits::RuleStoreTrait;

// Re-export error types for convenience
pub use rules_errors::{Result, RuleError};
