use super::partners_errors::Result;
use super::partners_model::{NewPartner, Partner};

/// Trait defining the contract for partner repository operations.
pub trait PartnerRepositoryTrait: Send + Sync {
    fn create(&self, new_partner: NewPartner) -> Result<Partner>;
    fn get_by_id(&self, partner_id: &str) -> Result<Partner>;
    fn list(&self) -> Result<Vec<Partner>>;
}
