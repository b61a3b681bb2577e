// programs/cairn_master/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum MasterError {
    #[msg("Unauthorized: caller is not governance")]
    Unauthorized,

    #[msg("Not emergency admin")]
    NotEmergencyAdmin,

    #[msg("System is paused")]
    SystemPaused,

    #[msg("Codes, addresses and types must have the same length")]
    LengthMismatch,

    #[msg("Contract code appears more than once")]
    DuplicateCode,

    #[msg("Contract code already in use")]
    CodeAlreadyInUse,

    #[msg("Contract code is not registered")]
    UnknownContractCode,

    #[msg("Contract address cannot be zero")]
    ZeroAddress,

    #[msg("Contract registry is full")]
    RegistryFull,
}
