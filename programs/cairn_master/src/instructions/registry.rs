// programs/cairn_master/src/instructions/registry.rs

use crate::errors::MasterError;
use crate::events::{ContractAdded, ContractRemoved, ContractUpgraded};
use crate::state::{codes_to_string, ContractRegistry, MasterConfig, PausableAction};
use anchor_lang::prelude::*;
use cairn_core::{ContractCode, ContractType};

/// Governance-gated registry mutation
#[derive(Accounts)]
pub struct ManageContracts<'info> {
    #[account(
        seeds = [MasterConfig::SEED_PREFIX],
        bump = master_config.bump,
    )]
    pub master_config: Account<'info, MasterConfig>,

    #[account(
        mut,
        seeds = [ContractRegistry::SEED_PREFIX],
        bump = contract_registry.bump,
    )]
    pub contract_registry: Account<'info, ContractRegistry>,

    #[account(
        constraint = master_config.is_governance(&governance.key()) @ MasterError::Unauthorized
    )]
    pub governance: Signer<'info>,
}

pub fn add_contracts(
    ctx: Context<ManageContracts>,
    codes: Vec<ContractCode>,
    addresses: Vec<Pubkey>,
    types: Vec<ContractType>,
) -> Result<()> {
    let clock = Clock::get()?;
    let added = ctx
        .accounts
        .contract_registry
        .add_contracts(&codes, &addresses, &types, ctx.program_id)?;

    for entry in &added {
        emit!(ContractAdded {
            code: entry.code,
            address: entry.address,
            contract_type: entry.contract_type,
            timestamp: clock.unix_timestamp,
        });
    }

    msg!("Contracts added: {}", codes_to_string(&codes));
    Ok(())
}

pub fn upgrade_contracts(
    ctx: Context<ManageContracts>,
    codes: Vec<ContractCode>,
    addresses: Vec<Pubkey>,
) -> Result<()> {
    ctx.accounts
        .master_config
        .ensure_allowed(PausableAction::UpgradeContracts)?;

    let clock = Clock::get()?;
    let upgrades = ctx
        .accounts
        .contract_registry
        .upgrade_contracts(&codes, &addresses)?;

    for upgrade in &upgrades {
        emit!(ContractUpgraded {
            code: upgrade.code,
            contract_type: upgrade.contract_type,
            latest_address: upgrade.latest_address,
            old_implementation: upgrade.old_implementation,
            new_implementation: upgrade.new_implementation,
            timestamp: clock.unix_timestamp,
        });
    }

    msg!("Contracts upgraded: {}", codes_to_string(&codes));
    Ok(())
}

pub fn remove_contracts(ctx: Context<ManageContracts>, codes: Vec<ContractCode>) -> Result<()> {
    let clock = Clock::get()?;
    let removed = ctx.accounts.contract_registry.remove_contracts(&codes)?;

    for entry in &removed {
        emit!(ContractRemoved {
            code: entry.code,
            address: entry.address,
            timestamp: clock.unix_timestamp,
        });
    }

    msg!("Contracts removed: {}", codes_to_string(&codes));
    Ok(())
}

// ==================== VIEWS ====================

#[derive(Accounts)]
pub struct ReadRegistry<'info> {
    #[account(
        seeds = [ContractRegistry::SEED_PREFIX],
        bump = contract_registry.bump,
    )]
    pub contract_registry: Account<'info, ContractRegistry>,
}

pub fn get_latest_address(ctx: Context<ReadRegistry>, code: ContractCode) -> Result<Pubkey> {
    let address = ctx.accounts.contract_registry.get_latest_address(&code);
    msg!("{} -> {}", cairn_core::codes::to_str(&code), address);
    Ok(address)
}

pub fn is_internal(ctx: Context<ReadRegistry>, address: Pubkey) -> Result<bool> {
    let internal = ctx.accounts.contract_registry.is_internal(&address);
    msg!("{} internal: {}", address, internal);
    Ok(internal)
}

pub fn get_contract_codes(ctx: Context<ReadRegistry>) -> Result<Vec<ContractCode>> {
    let codes = ctx.accounts.contract_registry.contract_codes();
    msg!("Registered codes: {}", codes_to_string(&codes));
    Ok(codes)
}

pub fn get_proxy_implementation(ctx: Context<ReadRegistry>, proxy: Pubkey) -> Result<Pubkey> {
    let implementation = ctx
        .accounts
        .contract_registry
        .proxy_implementation(&proxy)
        .unwrap_or_default();
    msg!("Proxy {} -> {}", proxy, implementation);
    Ok(implementation)
}
