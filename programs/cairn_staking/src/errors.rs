// programs/cairn_staking/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum StakingError {
    #[msg("Unauthorized: caller is not the pool manager")]
    Unauthorized,

    #[msg("Caller is not the cover contract")]
    OnlyCoverContract,

    #[msg("Tranche allocation exceeds the 32-bit unit cap")]
    AllocationOverflow,

    #[msg("Insufficient capacity")]
    InsufficientCapacity,

    #[msg("Total capacity is zero")]
    ZeroCapacity,

    #[msg("Invalid cover period")]
    InvalidCoverPeriod,

    #[msg("Premium exceeds the maximum accepted by the caller")]
    PremiumExceedsMax,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Tranche is not active")]
    InvalidTranche,

    #[msg("Too many tranches with stake")]
    TooManyTranches,

    #[msg("Too many tranche buckets for this product")]
    TooManyBuckets,

    #[msg("Product weight exceeds the maximum")]
    InvalidWeight,

    #[msg("Price must be between 1 and the price denominator")]
    InvalidPrice,

    #[msg("Global capacity ratio above the maximum")]
    InvalidCapacityRatio,

    #[msg("Capacity reduction exceeds the denominator")]
    InvalidCapacityReduction,

    #[msg("Grace period cannot be negative")]
    InvalidGracePeriod,

    #[msg("Product does not belong to this pool")]
    ProductPoolMismatch,

    #[msg("Math overflow")]
    MathOverflow,
}
