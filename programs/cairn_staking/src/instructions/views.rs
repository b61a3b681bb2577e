// programs/cairn_staking/src/instructions/views.rs

use crate::errors::StakingError;
use crate::state::{PremiumQuote, StakingPool, StakingProduct};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct ReadProduct<'info> {
    #[account(
        seeds = [StakingPool::SEED_PREFIX, &staking_pool.pool_id.to_le_bytes()],
        bump = staking_pool.bump,
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        constraint = staking_product.pool == staking_pool.key() @ StakingError::ProductPoolMismatch
    )]
    pub staking_product: Account<'info, StakingProduct>,
}

/// Live allocated units per active tranche, earliest first
pub fn get_active_allocations(ctx: Context<ReadProduct>) -> Result<Vec<u128>> {
    let now = Clock::get()?.unix_timestamp;
    let allocations = ctx.accounts.staking_product.get_active_allocations(now);
    msg!("Active allocations: {:?}", allocations);
    Ok(allocations)
}

/// Capacity units per active tranche, earliest first
pub fn get_active_tranche_capacities(ctx: Context<ReadProduct>) -> Result<Vec<u128>> {
    let now = Clock::get()?.unix_timestamp;
    let staking_pool = &ctx.accounts.staking_pool;
    let staking_product = &ctx.accounts.staking_product;

    let capacities = staking_product.get_active_tranche_capacities(
        staking_pool,
        now,
        staking_pool.global_capacity_ratio as u128,
        staking_product.capacity_reduction_ratio as u128,
    )?;
    msg!("Active tranche capacities: {:?}", capacities);
    Ok(capacities)
}

/// Premium and resulting price for a request, without reserving anything
pub fn calculate_premium(ctx: Context<ReadProduct>, amount: u128, period: i64) -> Result<PremiumQuote> {
    let now = Clock::get()?.unix_timestamp;
    let quote = ctx.accounts.staking_product.calculate_premium(
        &ctx.accounts.staking_pool,
        amount,
        period,
        now,
    )?;
    msg!("Premium {} (next price {})", quote.premium, quote.next_price);
    Ok(quote)
}
