// programs/cairn_staking/src/instructions/initialize.rs

use crate::errors::StakingError;
use crate::events::{ProductInitialized, StakingPoolInitialized};
use crate::state::{StakingPool, StakingProduct};
use anchor_lang::prelude::*;
use cairn_core::staking::CAPACITY_REDUCTION_DENOMINATOR;

// =============================================================================
// INITIALIZE STAKING POOL
// =============================================================================

#[derive(Accounts)]
#[instruction(params: InitializeStakingPoolParams)]
pub struct InitializeStakingPool<'info> {
    #[account(
        init,
        payer = manager,
        space = 8 + StakingPool::INIT_SPACE,
        seeds = [StakingPool::SEED_PREFIX, &params.pool_id.to_le_bytes()],
        bump
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(mut)]
    pub manager: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeStakingPoolParams {
    pub pool_id: u32,
    /// Capacity per unit of stake over 10_000 (0 selects the 2x default, max 10x)
    pub global_capacity_ratio: u32,
}

pub fn handler(ctx: Context<InitializeStakingPool>, params: InitializeStakingPoolParams) -> Result<()> {
    let clock = Clock::get()?;
    let global_capacity_ratio = StakingPool::resolve_global_capacity_ratio(params.global_capacity_ratio)?;

    let staking_pool = &mut ctx.accounts.staking_pool;
    staking_pool.pool_id = params.pool_id;
    staking_pool.manager = ctx.accounts.manager.key();
    staking_pool.global_capacity_ratio = global_capacity_ratio;
    staking_pool.tranches = vec![];
    staking_pool.product_count = 0;
    staking_pool.bump = ctx.bumps.staking_pool;

    emit!(StakingPoolInitialized {
        pool: staking_pool.key(),
        pool_id: params.pool_id,
        manager: staking_pool.manager,
        global_capacity_ratio,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// INITIALIZE PRODUCT
// =============================================================================

#[derive(Accounts)]
#[instruction(params: InitializeProductParams)]
pub struct InitializeProduct<'info> {
    #[account(
        mut,
        seeds = [StakingPool::SEED_PREFIX, &staking_pool.pool_id.to_le_bytes()],
        bump = staking_pool.bump,
        constraint = staking_pool.manager == manager.key() @ StakingError::Unauthorized
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        init,
        payer = manager,
        space = 8 + StakingProduct::INIT_SPACE,
        seeds = [
            StakingProduct::SEED_PREFIX,
            staking_pool.key().as_ref(),
            &params.product_id.to_le_bytes()
        ],
        bump
    )]
    pub staking_product: Account<'info, StakingProduct>,

    #[account(mut)]
    pub manager: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeProductParams {
    pub product_id: u32,
    /// Percent of pool stake backing the product
    pub weight: u8,
    pub initial_price: u64,
    pub target_price: u64,
    pub use_fixed_price: bool,
    /// Over 10_000
    pub capacity_reduction_ratio: u16,
    /// Seconds
    pub grace_period: i64,
}

pub fn initialize_product(ctx: Context<InitializeProduct>, params: InitializeProductParams) -> Result<()> {
    StakingProduct::validate_weight(params.weight)?;
    StakingProduct::validate_price(params.initial_price)?;
    StakingProduct::validate_price(params.target_price)?;
    require!(
        params.capacity_reduction_ratio as u128 <= CAPACITY_REDUCTION_DENOMINATOR,
        StakingError::InvalidCapacityReduction
    );
    require!(params.grace_period >= 0, StakingError::InvalidGracePeriod);

    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();

    let staking_product = &mut ctx.accounts.staking_product;
    staking_product.pool = pool_key;
    staking_product.product_id = params.product_id;
    staking_product.weight = params.weight;
    staking_product.capacity_reduction_ratio = params.capacity_reduction_ratio;
    staking_product.grace_period = params.grace_period;
    staking_product.use_fixed_price = params.use_fixed_price;
    staking_product.next_price = params.initial_price;
    staking_product.target_price = params.target_price;
    staking_product.last_update_time = clock.unix_timestamp;
    staking_product.buckets = vec![];
    staking_product.bump = ctx.bumps.staking_product;

    let staking_pool = &mut ctx.accounts.staking_pool;
    staking_pool.product_count = staking_pool
        .product_count
        .checked_add(1)
        .ok_or(StakingError::MathOverflow)?;

    emit!(ProductInitialized {
        pool: pool_key,
        product_id: params.product_id,
        weight: params.weight,
        initial_price: params.initial_price,
        target_price: params.target_price,
        use_fixed_price: params.use_fixed_price,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
