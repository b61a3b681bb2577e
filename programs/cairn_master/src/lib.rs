// programs/cairn_master/src/lib.rs
//
// Cairn Master Program
// ====================
// Contract registry and upgrade controller for the Cairn protocol.
// Maps two-byte contract codes to live addresses, answers internal-caller
// checks for the other programs, owns the upgradeability proxies and
// holds the system-wide emergency pause.

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod instructions;

use cairn_core::{ContractCode, ContractType};
use instructions::*;

declare_id!("52QuZSMNeQEmGY2KfwGywUYSX6FpsZgmRBtU2WuncKxU");

#[program]
pub mod cairn_master {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Create the master config and an empty contract registry
    pub fn initialize_master(
        ctx: Context<InitializeMaster>,
        params: InitializeMasterParams,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    // ==================== REGISTRY MANAGEMENT ====================

    /// Register new contract codes (governance only)
    pub fn add_contracts(
        ctx: Context<ManageContracts>,
        codes: Vec<ContractCode>,
        addresses: Vec<Pubkey>,
        types: Vec<ContractType>,
    ) -> Result<()> {
        instructions::registry::add_contracts(ctx, codes, addresses, types)
    }

    /// Point existing codes at new implementations (governance only).
    /// Allowed while the system is paused.
    pub fn upgrade_contracts(
        ctx: Context<ManageContracts>,
        codes: Vec<ContractCode>,
        addresses: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::registry::upgrade_contracts(ctx, codes, addresses)
    }

    /// Remove contract codes (governance only)
    pub fn remove_contracts(ctx: Context<ManageContracts>, codes: Vec<ContractCode>) -> Result<()> {
        instructions::registry::remove_contracts(ctx, codes)
    }

    /// Swap the master implementation, keeping all registry state
    pub fn upgrade_master(ctx: Context<UpgradeMaster>, new_implementation: Pubkey) -> Result<()> {
        instructions::upgrade::upgrade_master(ctx, new_implementation)
    }

    // ==================== EMERGENCY CONTROLS ====================

    /// Start or end the emergency pause (emergency admin only)
    pub fn set_emergency_pause(ctx: Context<SetEmergencyPause>, paused: bool) -> Result<()> {
        instructions::emergency::set_emergency_pause(ctx, paused)
    }

    /// Rotate the emergency admin (governance only)
    pub fn set_emergency_admin(ctx: Context<SetEmergencyAdmin>, new_admin: Pubkey) -> Result<()> {
        instructions::emergency::set_emergency_admin(ctx, new_admin)
    }

    // ==================== VIEWS ====================

    pub fn get_latest_address(ctx: Context<ReadRegistry>, code: ContractCode) -> Result<Pubkey> {
        instructions::registry::get_latest_address(ctx, code)
    }

    pub fn is_internal(ctx: Context<ReadRegistry>, address: Pubkey) -> Result<bool> {
        instructions::registry::is_internal(ctx, address)
    }

    pub fn get_contract_codes(ctx: Context<ReadRegistry>) -> Result<Vec<ContractCode>> {
        instructions::registry::get_contract_codes(ctx)
    }

    pub fn get_proxy_implementation(ctx: Context<ReadRegistry>, proxy: Pubkey) -> Result<Pubkey> {
        instructions::registry::get_proxy_implementation(ctx, proxy)
    }

    pub fn is_paused(ctx: Context<ReadMasterConfig>) -> Result<bool> {
        instructions::emergency::is_paused(ctx)
    }
}
