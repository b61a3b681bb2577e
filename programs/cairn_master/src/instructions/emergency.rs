// programs/cairn_master/src/instructions/emergency.rs

use crate::errors::MasterError;
use crate::events::{EmergencyAdminChanged, EmergencyPauseSet};
use crate::state::MasterConfig;
use anchor_lang::prelude::*;

/// Start or end the emergency pause. Authorization is checked against the
/// stored emergency admin inside set_emergency_pause.
#[derive(Accounts)]
pub struct SetEmergencyPause<'info> {
    #[account(
        mut,
        seeds = [MasterConfig::SEED_PREFIX],
        bump = master_config.bump,
    )]
    pub master_config: Account<'info, MasterConfig>,

    pub emergency_admin: Signer<'info>,
}

pub fn set_emergency_pause(ctx: Context<SetEmergencyPause>, paused: bool) -> Result<()> {
    let clock = Clock::get()?;
    let admin = ctx.accounts.emergency_admin.key();

    ctx.accounts
        .master_config
        .set_emergency_pause(&admin, paused, clock.unix_timestamp)?;

    emit!(EmergencyPauseSet {
        admin,
        paused,
        timestamp: clock.unix_timestamp,
    });

    msg!("Emergency pause set to {}", paused);
    Ok(())
}

#[derive(Accounts)]
pub struct SetEmergencyAdmin<'info> {
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

pub fn set_emergency_admin(ctx: Context<SetEmergencyAdmin>, new_admin: Pubkey) -> Result<()> {
    let clock = Clock::get()?;
    let governance = ctx.accounts.governance.key();

    let old_admin = ctx
        .accounts
        .master_config
        .set_emergency_admin(&governance, new_admin)?;

    emit!(EmergencyAdminChanged {
        old_admin,
        new_admin,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ReadMasterConfig<'info> {
    #[account(
        seeds = [MasterConfig::SEED_PREFIX],
        bump = master_config.bump,
    )]
    pub master_config: Account<'info, MasterConfig>,
}

pub fn is_paused(ctx: Context<ReadMasterConfig>) -> Result<bool> {
    let paused = ctx.accounts.master_config.is_paused();
    msg!("Paused: {}", paused);
    Ok(paused)
}
