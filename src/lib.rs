pub mod db;

pub mod advertisers;
pub mod coupons;
pub mod partners;

pub mod constants;
pub mod errors;
pub mod performance;
pub mod pipeline;
pub mod pricing;
pub mod rules;
pub mod schema;
pub mod tiers;
pub mod transactions;

pub use pipeline::*;
pub use pricing::*;
