// programs/cairn_staking/src/events.rs

use crate::state::TrancheAllocation;
use anchor_lang::prelude::*;

/// Emitted when a staking pool is created
#[event]
pub struct StakingPoolInitialized {
    pub pool: Pubkey,
    pub pool_id: u32,
    pub manager: Pubkey,
    pub global_capacity_ratio: u32,
    pub timestamp: i64,
}

/// Emitted when a product is added to a pool
#[event]
pub struct ProductInitialized {
    pub pool: Pubkey,
    pub product_id: u32,
    pub weight: u8,
    pub initial_price: u64,
    pub target_price: u64,
    pub use_fixed_price: bool,
    pub timestamp: i64,
}

#[event]
pub struct ProductTargetPriceUpdated {
    pub pool: Pubkey,
    pub product_id: u32,
    pub old_target_price: u64,
    pub new_target_price: u64,
    pub timestamp: i64,
}

#[event]
pub struct ProductWeightUpdated {
    pub pool: Pubkey,
    pub product_id: u32,
    pub old_weight: u8,
    pub new_weight: u8,
    pub timestamp: i64,
}

/// Emitted when stake is recorded in a tranche
#[event]
pub struct StakeDeposited {
    pub pool: Pubkey,
    pub staker: Pubkey,
    pub tranche_id: u32,
    pub amount: u128,
    pub tranche_stake: u128,
    pub timestamp: i64,
}

/// Emitted when the cover flow reserves capacity
#[event]
pub struct AllocationRequested {
    pub pool: Pubkey,
    pub product_id: u32,
    pub cover: Pubkey,
    pub amount: u128,
    pub period: i64,
    pub premium: u128,
    pub base_price: u128,
    pub next_price: u128,
    pub expiration_bucket_id: u32,
    pub allocations: Vec<TrancheAllocation>,
    pub timestamp: i64,
}

/// Emitted once per expiration bucket whose allocations were released
#[event]
pub struct BucketExpired {
    pub pool: Pubkey,
    pub product_id: u32,
    pub bucket_id: u32,
    pub allocation_freed: u64,
    pub timestamp: i64,
}

/// Emitted when a tranche's stake leaves the active window
#[event]
pub struct TrancheExpired {
    pub pool: Pubkey,
    pub tranche_id: u32,
    pub stake: u128,
    pub timestamp: i64,
}
