// programs/cairn_master/src/instructions/upgrade.rs

use crate::errors::MasterError;
use crate::events::MasterUpgraded;
use crate::state::MasterConfig;
use anchor_lang::prelude::*;

/// Swap the master's own implementation. The config and registry accounts
/// are PDAs of this program, so they outlive the swap unchanged.
#[derive(Accounts)]
pub struct UpgradeMaster<'info> {
    #[account(
        mut,
        seeds = [MasterConfig::SEED_PREFIX],
        bump = master_config.bump,
    )]
    pub master_config: Account<'info, MasterConfig>,

    #[account(
        constraint = master_config.is_governance(&governance.key()) @ MasterError::Unauthorized
    )]
    pub governance: Signer<'info>,
}

pub fn upgrade_master(ctx: Context<UpgradeMaster>, new_implementation: Pubkey) -> Result<()> {
    let clock = Clock::get()?;
    let governance = ctx.accounts.governance.key();
    let master_config = &mut ctx.accounts.master_config;

    let old_implementation = master_config.upgrade_master(&governance, new_implementation)?;

    emit!(MasterUpgraded {
        old_implementation,
        new_implementation,
        upgrade_count: master_config.master_upgrade_count,
        timestamp: clock.unix_timestamp,
    });

    msg!("Master upgraded to {}", new_implementation);
    Ok(())
}
