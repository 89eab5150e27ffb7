use super::advertisers_errors::Result;
use super::advertisers_model::{Advertiser, NewAdvertiser};

/// Trait defining the contract for advertiser repository operations.
pub trait AdvertiserRepositoryTrait: Send + Sync {
    fn create(&self, new_advertiser: NewAdvertiser) -> Result<Advertiser>;
    fn get_by_id(&self, advertiser_id: &str) -> Result<Advertiser>;
    fn get_by_name(&self, advertiser_name: &str) -> Result<Advertiser>;
    fn list(&self) -> Result<Vec<Advertiser>>;
}
