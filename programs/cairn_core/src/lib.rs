// programs/cairn_core/src/lib.rs
//
// Cairn Core - Shared Constants and Integer Math
// ==============================================
//
// This module provides:
// - Pricing constants (price denominators, bump/decay ratios, surge curve)
// - Staking constants (allocation units, tranche and bucket durations)
// - Two-byte contract codes used by the master registry
// - The Replaceable/Proxy contract type
// - Integer helpers shared by every program (div_ceil, mul_div)
//
// Premiums and prices are compared for exact equality against reference
// calculations, so every program must use these helpers and nothing else.

use anchor_lang::prelude::*;

// =============================================================================
// SUBMODULES
// =============================================================================

/// Floor/ceil integer helpers
pub mod math;

pub use math::{div_ceil, mul_div, to_allocation_units};

// =============================================================================
// TIME
// =============================================================================

pub mod time {
    /// Seconds per day
    pub const ONE_DAY: i64 = 86_400;

    /// Seconds per year (365 days), the premium annualisation base
    pub const ONE_YEAR: i64 = 365 * ONE_DAY;

    /// Stake commitment window
    pub const TRANCHE_DURATION: i64 = 91 * ONE_DAY;

    /// Cover expiration granularity
    pub const BUCKET_DURATION: i64 = 28 * ONE_DAY;

    /// Id of the tranche containing `timestamp`
    pub fn tranche_id_at(timestamp: i64) -> u32 {
        (timestamp.max(0) / TRANCHE_DURATION) as u32
    }

    /// Id of the bucket containing `timestamp`
    pub fn bucket_id_at(timestamp: i64) -> u32 {
        (timestamp.max(0) / BUCKET_DURATION) as u32
    }

    /// First bucket that starts at or after `timestamp`
    pub fn expiration_bucket_id(timestamp: i64) -> u32 {
        let t = timestamp.max(0);
        (t.saturating_add(BUCKET_DURATION - 1) / BUCKET_DURATION) as u32
    }
}

// =============================================================================
// STAKING / ALLOCATION CONSTANTS
// =============================================================================

pub mod staking {
    /// Token base units per whole token (18 decimals)
    pub const ONE_NXM: u128 = 1_000_000_000_000_000_000;

    /// Allocation units per whole token
    pub const ALLOCATION_UNITS_PER_NXM: u128 = 100;

    /// Token base units represented by one allocation unit
    pub const NXM_PER_ALLOCATION_UNIT: u128 = ONE_NXM / ALLOCATION_UNITS_PER_NXM;

    /// Number of tranches open for deposits and allocations at any time
    pub const MAX_ACTIVE_TRANCHES: u32 = 8;

    /// Global capacity ratio (2x), expressed over GLOBAL_CAPACITY_DENOMINATOR
    pub const DEFAULT_GLOBAL_CAPACITY_RATIO: u128 = 20_000;
    pub const GLOBAL_CAPACITY_DENOMINATOR: u128 = 10_000;
    pub const MAX_GLOBAL_CAPACITY_RATIO: u128 = 100_000;

    /// Per-product capacity reduction, expressed over CAPACITY_REDUCTION_DENOMINATOR
    pub const CAPACITY_REDUCTION_DENOMINATOR: u128 = 10_000;

    /// Product weights are percentages of pool stake
    pub const WEIGHT_DENOMINATOR: u128 = 100;
    pub const MAX_PRODUCT_WEIGHT: u8 = 100;

    /// Cover period bounds
    pub const MIN_COVER_PERIOD: i64 = 28 * super::time::ONE_DAY;
    pub const MAX_COVER_PERIOD: i64 = 365 * super::time::ONE_DAY;

    /// Upper bound on live tranche buckets per product:
    /// one per (active tranche, bucket a max-length cover can land in)
    pub const MAX_TRANCHE_BUCKETS: usize = 8 * 16;
}

// =============================================================================
// PRICING CONSTANTS
// =============================================================================

pub mod pricing {
    /// Price ratios are expressed over this denominator (10000 = 100%)
    pub const INITIAL_PRICE_DENOMINATOR: u128 = 10_000;
    pub const TARGET_PRICE_DENOMINATOR: u128 = 10_000;

    /// Bumped price decays by 0.5% per day towards the target price
    pub const PRICE_CHANGE_PER_DAY: u128 = 50;

    /// +0.2% price for every 1% of capacity bought, ie +20% for 100%
    pub const PRICE_BUMP_RATIO: u128 = 2_000;

    /// Surge pricing starts at 90% utilisation
    pub const SURGE_THRESHOLD_RATIO: u128 = 9_000;
    pub const SURGE_THRESHOLD_DENOMINATOR: u128 = 10_000;

    /// Slope of the surge price curve (18 decimals). At 100% utilisation the
    /// marginal surge price reaches 2 * (1 - 0.9) = 20%.
    pub const SURGE_PRICE_RATIO: u128 = 2_000_000_000_000_000_000;
}

// =============================================================================
// CONTRACT CODES
// =============================================================================

/// Two-byte ASCII identifier of a registered contract
pub type ContractCode = [u8; 2];

pub mod codes {
    use super::ContractCode;

    /// Cover purchase flow - the only caller allowed to request allocations
    pub const COVER: ContractCode = *b"CO";
    /// Staking pool factory
    pub const STAKING_POOL_FACTORY: ContractCode = *b"SP";
    pub const TOKEN_CONTROLLER: ContractCode = *b"TC";
    /// Capital pool
    pub const POOL: ContractCode = *b"P1";
    pub const MCR: ContractCode = *b"MC";
    pub const GOVERNANCE: ContractCode = *b"GV";
    pub const MEMBER_ROLES: ContractCode = *b"MR";
    pub const PROPOSAL_CATEGORY: ContractCode = *b"PC";
    pub const COVER_NFT: ContractCode = *b"CL";
    pub const CLAIMS_REWARD: ContractCode = *b"CR";
    pub const POOLED_STAKING: ContractCode = *b"PS";
    pub const GATEWAY: ContractCode = *b"GW";
    pub const INDIVIDUAL_CLAIMS: ContractCode = *b"IC";
    pub const ASSESSMENT: ContractCode = *b"AS";
    pub const RAMM: ContractCode = *b"RA";

    /// Render a code for logs ("??" for non-ASCII bytes)
    pub fn to_str(code: &ContractCode) -> &str {
        std::str::from_utf8(code).unwrap_or("??")
    }
}

/// How a registry entry resolves to its live implementation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum ContractType {
    /// Registry stores the live address; upgrades change the address
    Replaceable,
    /// Registry stores a stable proxy address; upgrades swap the proxy's
    /// implementation pointer
    Proxy,
}

impl ContractType {
    pub fn is_proxy(&self) -> bool {
        matches!(self, ContractType::Proxy)
    }
}
