// programs/cairn_master/src/instructions/initialize.rs

use crate::errors::MasterError;
use crate::events::MasterInitialized;
use crate::state::{ContractRegistry, MasterConfig};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct InitializeMaster<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + MasterConfig::INIT_SPACE,
        seeds = [MasterConfig::SEED_PREFIX],
        bump
    )]
    pub master_config: Account<'info, MasterConfig>,

    #[account(
        init,
        payer = payer,
        space = 8 + ContractRegistry::INIT_SPACE,
        seeds = [ContractRegistry::SEED_PREFIX],
        bump
    )]
    pub contract_registry: Account<'info, ContractRegistry>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeMasterParams {
    /// Governance executor allowed to mutate the registry
    pub governance: Pubkey,
    /// Identity allowed to toggle the emergency pause
    pub emergency_admin: Pubkey,
    /// Initial master implementation
    pub implementation: Pubkey,
}

pub fn handler(ctx: Context<InitializeMaster>, params: InitializeMasterParams) -> Result<()> {
    require!(params.governance != Pubkey::default(), MasterError::ZeroAddress);
    require!(params.emergency_admin != Pubkey::default(), MasterError::ZeroAddress);

    let clock = Clock::get()?;

    let master_config = &mut ctx.accounts.master_config;
    master_config.governance = params.governance;
    master_config.emergency_admin = params.emergency_admin;
    master_config.paused = false;
    master_config.paused_at = 0;
    master_config.implementation = params.implementation;
    master_config.master_upgrade_count = 0;
    master_config.bump = ctx.bumps.master_config;
    master_config.reserved = vec![];

    let registry = &mut ctx.accounts.contract_registry;
    registry.entries = vec![];
    registry.proxies = vec![];
    registry.bump = ctx.bumps.contract_registry;

    emit!(MasterInitialized {
        governance: params.governance,
        emergency_admin: params.emergency_admin,
        implementation: params.implementation,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
