// programs/cairn_staking/src/instructions/deposit.rs

use crate::events::StakeDeposited;
use crate::instructions::allocation::expire_tranches;
use crate::state::StakingPool;
use anchor_lang::prelude::*;
use cairn_master::state::{require_not_paused, MasterConfig};

/// Record stake in one of the active tranches. Token custody lives outside
/// this program, only the stake ledger is kept here.
#[derive(Accounts)]
pub struct DepositTo<'info> {
    #[account(
        seeds = [MasterConfig::SEED_PREFIX],
        bump = master_config.bump,
        seeds::program = cairn_master::ID,
    )]
    pub master_config: Account<'info, MasterConfig>,

    #[account(
        mut,
        seeds = [StakingPool::SEED_PREFIX, &staking_pool.pool_id.to_le_bytes()],
        bump = staking_pool.bump,
    )]
    pub staking_pool: Account<'info, StakingPool>,

    pub staker: Signer<'info>,
}

pub fn deposit_to(ctx: Context<DepositTo>, amount: u128, tranche_id: u32) -> Result<()> {
    require_not_paused(&ctx.accounts.master_config)?;

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let pool_key = ctx.accounts.staking_pool.key();
    let staking_pool = &mut ctx.accounts.staking_pool;

    // frees slots held by tranches that already ended
    expire_tranches(staking_pool, pool_key, now);

    let tranche_stake = staking_pool.deposit(amount, tranche_id, now)?;

    emit!(StakeDeposited {
        pool: pool_key,
        staker: ctx.accounts.staker.key(),
        tranche_id,
        amount,
        tranche_stake,
        timestamp: now,
    });

    Ok(())
}
