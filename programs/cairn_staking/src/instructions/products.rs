// programs/cairn_staking/src/instructions/products.rs

use crate::errors::StakingError;
use crate::events::{ProductTargetPriceUpdated, ProductWeightUpdated};
use crate::state::{StakingPool, StakingProduct};
use anchor_lang::prelude::*;

/// Manager-only product settings
#[derive(Accounts)]
pub struct UpdateProduct<'info> {
    #[account(
        seeds = [StakingPool::SEED_PREFIX, &staking_pool.pool_id.to_le_bytes()],
        bump = staking_pool.bump,
        constraint = staking_pool.manager == manager.key() @ StakingError::Unauthorized
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

    pub manager: Signer<'info>,
}

pub fn set_product_target_price(ctx: Context<UpdateProduct>, target_price: u64) -> Result<()> {
    let clock = Clock::get()?;
    let staking_product = &mut ctx.accounts.staking_product;
    let old_target_price = staking_product.target_price;

    staking_product.set_target_price(target_price)?;

    emit!(ProductTargetPriceUpdated {
        pool: staking_product.pool,
        product_id: staking_product.product_id,
        old_target_price,
        new_target_price: target_price,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

pub fn set_product_weight(ctx: Context<UpdateProduct>, weight: u8) -> Result<()> {
    let clock = Clock::get()?;
    let staking_product = &mut ctx.accounts.staking_product;
    let old_weight = staking_product.weight;

    staking_product.set_weight(weight)?;

    emit!(ProductWeightUpdated {
        pool: staking_product.pool,
        product_id: staking_product.product_id,
        old_weight,
        new_weight: weight,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
