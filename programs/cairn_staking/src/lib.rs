// programs/cairn_staking/src/lib.rs
//
// Cairn Staking Program
// =====================
// Staking pool capacity and cover pricing:
// - Per-tranche stake ledger (91-day tranches, 8 active at a time)
// - Per-product price state with linear daily decay towards a target price
// - Price bump proportional to the share of capacity bought
// - Surge premium above 90% utilisation
// - Tranche-bucket allocation ledger with a 32-bit unit cap per tranche
//
// Allocations are only accepted from the cover contract registered in the
// master registry, and only while the master pause flag is clear.

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod pricing;
pub mod instructions;

use instructions::*;
use state::{AllocationRequest, PremiumQuote};

declare_id!("YXnqqFmtNWkuzhZjQy9zi9QJU7JBVyDdENHwEsQZ7N7");

#[program]
pub mod cairn_staking {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Create a staking pool
    pub fn initialize_staking_pool(
        ctx: Context<InitializeStakingPool>,
        params: InitializeStakingPoolParams,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    /// Add a product to a pool (manager only)
    pub fn initialize_product(
        ctx: Context<InitializeProduct>,
        params: InitializeProductParams,
    ) -> Result<()> {
        instructions::initialize::initialize_product(ctx, params)
    }

    // ==================== PRODUCT SETTINGS ====================

    pub fn set_product_target_price(ctx: Context<UpdateProduct>, target_price: u64) -> Result<()> {
        instructions::products::set_product_target_price(ctx, target_price)
    }

    pub fn set_product_weight(ctx: Context<UpdateProduct>, weight: u8) -> Result<()> {
        instructions::products::set_product_weight(ctx, weight)
    }

    // ==================== STAKE ====================

    /// Record stake in an active tranche
    pub fn deposit_to(ctx: Context<DepositTo>, amount: u128, tranche_id: u32) -> Result<()> {
        instructions::deposit::deposit_to(ctx, amount, tranche_id)
    }

    // ==================== ALLOCATION ====================

    /// Reserve capacity for a cover and charge the premium (cover contract only)
    pub fn request_allocation(
        ctx: Context<RequestAllocation>,
        request: AllocationRequest,
    ) -> Result<()> {
        instructions::allocation::request_allocation(ctx, request)
    }

    /// Release expired tranches and buckets (permissionless)
    pub fn process_expirations(ctx: Context<ProcessExpirations>) -> Result<()> {
        instructions::allocation::process_expirations(ctx)
    }

    // ==================== VIEWS ====================

    pub fn get_active_allocations(ctx: Context<ReadProduct>) -> Result<Vec<u128>> {
        instructions::views::get_active_allocations(ctx)
    }

    pub fn get_active_tranche_capacities(ctx: Context<ReadProduct>) -> Result<Vec<u128>> {
        instructions::views::get_active_tranche_capacities(ctx)
    }

    pub fn calculate_premium(
        ctx: Context<ReadProduct>,
        amount: u128,
        period: i64,
    ) -> Result<PremiumQuote> {
        instructions::views::calculate_premium(ctx, amount, period)
    }
}

/// Public helpers for CPI
pub mod staking_helpers {
    use super::*;

    pub fn staking_pool_address(pool_id: u32) -> Pubkey {
        Pubkey::find_program_address(&[state::StakingPool::SEED_PREFIX, &pool_id.to_le_bytes()], &ID).0
    }

    pub fn staking_product_address(staking_pool: &Pubkey, product_id: u32) -> Pubkey {
        Pubkey::find_program_address(
            &[
                state::StakingProduct::SEED_PREFIX,
                staking_pool.as_ref(),
                &product_id.to_le_bytes(),
            ],
            &ID,
        )
        .0
    }
}
