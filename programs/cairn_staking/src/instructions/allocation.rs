// programs/cairn_staking/src/instructions/allocation.rs
//
// Capacity Allocation
// ===================
// request_allocation is the only entry point the cover flow uses. The caller
// must be the address the master registry resolves for the cover code, and
// the master pause flag must be clear. Expired tranches and buckets are
// swept first so freed capacity is available to the request.

use crate::errors::StakingError;
use crate::events::{AllocationRequested, BucketExpired, TrancheExpired};
use crate::state::{group_by_bucket, AllocationRequest, StakingPool, StakingProduct};
use anchor_lang::prelude::*;
use cairn_core::codes;
use cairn_master::state::{ContractRegistry, MasterConfig, PausableAction};

// =============================================================================
// REQUEST ALLOCATION
// =============================================================================

#[derive(Accounts)]
pub struct RequestAllocation<'info> {
    #[account(
        seeds = [MasterConfig::SEED_PREFIX],
        bump = master_config.bump,
        seeds::program = cairn_master::ID,
    )]
    pub master_config: Account<'info, MasterConfig>,

    #[account(
        seeds = [ContractRegistry::SEED_PREFIX],
        bump = contract_registry.bump,
        seeds::program = cairn_master::ID,
    )]
    pub contract_registry: Account<'info, ContractRegistry>,

    #[account(
        mut,
        seeds = [StakingPool::SEED_PREFIX, &staking_pool.pool_id.to_le_bytes()],
        bump = staking_pool.bump,
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        mut,
        seeds = [
            StakingProduct::SEED_PREFIX,
            staking_pool.key().as_ref(),
            &staking_product.product_id.to_le_bytes()
        ],
        bump = staking_product.bump,
    )]
    pub staking_product: Account<'info, StakingProduct>,

    /// Cover contract, resolved through the registry on every call
    #[account(
        constraint = contract_registry.get_latest_address(&codes::COVER) == cover.key()
            @ StakingError::OnlyCoverContract
    )]
    pub cover: Signer<'info>,
}

pub fn request_allocation(ctx: Context<RequestAllocation>, request: AllocationRequest) -> Result<()> {
    ctx.accounts
        .master_config
        .ensure_allowed(PausableAction::BuyCover)?;

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let pool_key = ctx.accounts.staking_pool.key();

    let staking_pool = &mut ctx.accounts.staking_pool;
    let staking_product = &mut ctx.accounts.staking_product;

    expire_tranches(staking_pool, pool_key, now);
    expire_buckets(staking_product, pool_key, now);

    let outcome = staking_product.allocate(staking_pool, &request, now)?;

    msg!(
        "Allocated {} units for product {}: premium {}, price {} -> {}",
        outcome.quote.units,
        staking_product.product_id,
        outcome.quote.premium,
        outcome.quote.base_price,
        outcome.quote.next_price
    );

    emit!(AllocationRequested {
        pool: pool_key,
        product_id: staking_product.product_id,
        cover: ctx.accounts.cover.key(),
        amount: request.amount,
        period: request.period,
        premium: outcome.quote.premium,
        base_price: outcome.quote.base_price,
        next_price: outcome.quote.next_price,
        expiration_bucket_id: outcome.expiration_bucket_id,
        allocations: outcome.allocations,
        timestamp: now,
    });

    Ok(())
}

// =============================================================================
// PROCESS EXPIRATIONS
// =============================================================================

/// Permissionless sweep of expired tranches and buckets
#[derive(Accounts)]
pub struct ProcessExpirations<'info> {
    #[account(
        mut,
        seeds = [StakingPool::SEED_PREFIX, &staking_pool.pool_id.to_le_bytes()],
        bump = staking_pool.bump,
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        mut,
        constraint = staking_product.pool == staking_pool.key() @ StakingError::ProductPoolMismatch
    )]
    pub staking_product: Account<'info, StakingProduct>,
}

pub fn process_expirations(ctx: Context<ProcessExpirations>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.staking_pool.key();

    expire_tranches(&mut ctx.accounts.staking_pool, pool_key, now);
    expire_buckets(&mut ctx.accounts.staking_product, pool_key, now);

    Ok(())
}

pub(crate) fn expire_tranches(staking_pool: &mut StakingPool, pool_key: Pubkey, now: i64) {
    for tranche in staking_pool.expire_tranches(now) {
        emit!(TrancheExpired {
            pool: pool_key,
            tranche_id: tranche.tranche_id,
            stake: tranche.stake,
            timestamp: now,
        });
    }
}

pub(crate) fn expire_buckets(staking_product: &mut StakingProduct, pool_key: Pubkey, now: i64) {
    let expired = staking_product.expire_buckets(now);
    for (bucket_id, allocation_freed) in group_by_bucket(&expired) {
        emit!(BucketExpired {
            pool: pool_key,
            product_id: staking_product.product_id,
            bucket_id,
            allocation_freed,
            timestamp: now,
        });
    }
}
