// programs/cairn_master/src/events.rs

use anchor_lang::prelude::*;
use cairn_core::{ContractCode, ContractType};

/// Emitted when the master is initialized
#[event]
pub struct MasterInitialized {
    pub governance: Pubkey,
    pub emergency_admin: Pubkey,
    pub implementation: Pubkey,
    pub timestamp: i64,
}

/// Emitted once per newly registered code
#[event]
pub struct ContractAdded {
    pub code: ContractCode,
    pub address: Pubkey,
    pub contract_type: ContractType,
    pub timestamp: i64,
}

/// Emitted once per upgraded code
#[event]
pub struct ContractUpgraded {
    pub code: ContractCode,
    pub contract_type: ContractType,
    pub latest_address: Pubkey,
    pub old_implementation: Pubkey,
    pub new_implementation: Pubkey,
    pub timestamp: i64,
}

/// Emitted once per removed code
#[event]
pub struct ContractRemoved {
    pub code: ContractCode,
    pub address: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyPauseSet {
    pub admin: Pubkey,
    pub paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyAdminChanged {
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the master implementation is swapped
#[event]
pub struct MasterUpgraded {
    pub old_implementation: Pubkey,
    pub new_implementation: Pubkey,
    pub upgrade_count: u64,
    pub timestamp: i64,
}
