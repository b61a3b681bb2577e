// programs/cairn_staking/src/state.rs

use crate::errors::StakingError;
use crate::pricing;
use anchor_lang::prelude::*;
use cairn_core::pricing::{PRICE_BUMP_RATIO, PRICE_CHANGE_PER_DAY, TARGET_PRICE_DENOMINATOR};
use cairn_core::staking::{
    CAPACITY_REDUCTION_DENOMINATOR, DEFAULT_GLOBAL_CAPACITY_RATIO, GLOBAL_CAPACITY_DENOMINATOR,
    MAX_ACTIVE_TRANCHES, MAX_COVER_PERIOD, MAX_GLOBAL_CAPACITY_RATIO, MAX_PRODUCT_WEIGHT,
    MAX_TRANCHE_BUCKETS, MIN_COVER_PERIOD, NXM_PER_ALLOCATION_UNIT, WEIGHT_DENOMINATOR,
};
use cairn_core::time::{bucket_id_at, expiration_bucket_id, tranche_id_at};
use cairn_core::{mul_div, to_allocation_units};

/// Staking pool: per-tranche stake ledger and capacity settings
/// PDA seeds: ["staking_pool", pool_id]
#[account]
#[derive(InitSpace)]
pub struct StakingPool {
    /// Pool identifier
    pub pool_id: u32,

    /// Manager allowed to configure products
    pub manager: Pubkey,

    /// Capacity per unit of stake, over GLOBAL_CAPACITY_DENOMINATOR
    pub global_capacity_ratio: u32,

    /// Stake per tranche, sorted by tranche id
    #[max_len(8)]
    pub tranches: Vec<TrancheStake>,

    /// Number of products initialized in this pool
    pub product_count: u32,

    /// Bump seed
    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct TrancheStake {
    pub tranche_id: u32,
    pub stake: u128,
}

impl StakingPool {
    pub const SEED_PREFIX: &'static [u8] = b"staking_pool";

    /// Capacity ratio to store for a new pool: 0 selects the default, anything
    /// above MAX_GLOBAL_CAPACITY_RATIO is rejected
    pub fn resolve_global_capacity_ratio(requested: u32) -> Result<u32> {
        if requested == 0 {
            return Ok(DEFAULT_GLOBAL_CAPACITY_RATIO as u32);
        }
        require!(
            requested as u128 <= MAX_GLOBAL_CAPACITY_RATIO,
            StakingError::InvalidCapacityRatio
        );
        Ok(requested)
    }

    pub fn first_active_tranche_id(now: i64) -> u32 {
        tranche_id_at(now)
    }

    /// Tranches in [first_active, first_active + MAX_ACTIVE_TRANCHES)
    pub fn is_active_tranche(tranche_id: u32, now: i64) -> bool {
        let first = Self::first_active_tranche_id(now);
        tranche_id >= first && tranche_id < first.saturating_add(MAX_ACTIVE_TRANCHES)
    }

    pub fn stake_in(&self, tranche_id: u32) -> u128 {
        self.tranches
            .iter()
            .find(|t| t.tranche_id == tranche_id)
            .map(|t| t.stake)
            .unwrap_or(0)
    }

    /// Record stake in an active tranche. Returns the tranche's new stake.
    pub fn deposit(&mut self, amount: u128, tranche_id: u32, now: i64) -> Result<u128> {
        require!(amount > 0, StakingError::InvalidAmount);
        require!(
            Self::is_active_tranche(tranche_id, now),
            StakingError::InvalidTranche
        );

        match self.tranches.iter().position(|t| t.tranche_id == tranche_id) {
            Some(i) => {
                let stake = self.tranches[i]
                    .stake
                    .checked_add(amount)
                    .ok_or(StakingError::MathOverflow)?;
                self.tranches[i].stake = stake;
                Ok(stake)
            }
            None => {
                require!(
                    self.tranches.len() < MAX_ACTIVE_TRANCHES as usize,
                    StakingError::TooManyTranches
                );
                self.tranches.push(TrancheStake {
                    tranche_id,
                    stake: amount,
                });
                self.tranches.sort_by_key(|t| t.tranche_id);
                Ok(amount)
            }
        }
    }

    /// Drop tranches that ended before the current one
    pub fn expire_tranches(&mut self, now: i64) -> Vec<TrancheStake> {
        let first = Self::first_active_tranche_id(now);
        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tranches)
            .into_iter()
            .partition(|t| t.tranche_id < first);
        self.tranches = active;
        expired
    }
}

/// Allocation ledger entry: units reserved in a tranche until a bucket boundary
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct TrancheBucket {
    pub tranche_id: u32,
    pub expiration_bucket_id: u32,
    pub allocated_amount: u32,
}

/// Units taken from one tranche by an allocation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrancheAllocation {
    pub tranche_id: u32,
    pub amount: u32,
}

/// Capacity request from the cover flow
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationRequest {
    /// Cover amount in token base units
    pub amount: u128,
    /// Cover period in seconds
    pub period: i64,
    /// Upper bound on the premium the caller accepts
    pub max_premium: u128,
}

/// Premium and price movement for a would-be allocation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PremiumQuote {
    /// Amount charged, in allocation units
    pub units: u128,
    pub premium: u128,
    pub premium_per_year: u128,
    /// Net surge included in premium_per_year
    pub surge_premium: u128,
    pub base_price: u128,
    /// Product price after the allocation
    pub next_price: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationOutcome {
    pub quote: PremiumQuote,
    pub allocations: Vec<TrancheAllocation>,
    pub expiration_bucket_id: u32,
    pub total_capacity: u128,
    pub initial_capacity_used: u128,
}

/// Pricing state and allocation ledger of one product in one pool
/// PDA seeds: ["staking_product", staking_pool, product_id]
#[account]
#[derive(InitSpace)]
pub struct StakingProduct {
    /// Pool this product belongs to
    pub pool: Pubkey,

    pub product_id: u32,

    /// Share of pool stake backing this product, in percent
    pub weight: u8,

    /// Capacity haircut, over CAPACITY_REDUCTION_DENOMINATOR
    pub capacity_reduction_ratio: u16,

    /// Seconds a cover stays claimable after it ends
    pub grace_period: i64,

    /// Charge target_price with no surge and no price movement
    pub use_fixed_price: bool,

    /// Price before decay, over INITIAL_PRICE_DENOMINATOR
    pub next_price: u64,

    /// Decay floor, over TARGET_PRICE_DENOMINATOR
    pub target_price: u64,

    pub last_update_time: i64,

    #[max_len(128)]
    pub buckets: Vec<TrancheBucket>,

    /// Bump seed
    pub bump: u8,
}

impl StakingProduct {
    pub const SEED_PREFIX: &'static [u8] = b"staking_product";

    pub fn validate_price(price: u64) -> Result<()> {
        require!(
            price > 0 && price as u128 <= TARGET_PRICE_DENOMINATOR,
            StakingError::InvalidPrice
        );
        Ok(())
    }

    pub fn validate_weight(weight: u8) -> Result<()> {
        require!(weight <= MAX_PRODUCT_WEIGHT, StakingError::InvalidWeight);
        Ok(())
    }

    pub fn set_target_price(&mut self, target_price: u64) -> Result<()> {
        Self::validate_price(target_price)?;
        self.target_price = target_price;
        Ok(())
    }

    pub fn set_weight(&mut self, weight: u8) -> Result<()> {
        Self::validate_weight(weight)?;
        self.weight = weight;
        Ok(())
    }

    /// Decayed price at `now`
    pub fn base_price(&self, now: i64) -> u128 {
        pricing::calculate_base_price(
            self.next_price as u128,
            self.target_price as u128,
            self.last_update_time,
            now,
            PRICE_CHANGE_PER_DAY,
        )
    }

    fn is_live(bucket: &TrancheBucket, now: i64) -> bool {
        bucket.tranche_id >= tranche_id_at(now) && bucket.expiration_bucket_id > bucket_id_at(now)
    }

    fn bucket_index(&self, tranche_id: u32, expiration_bucket_id: u32) -> Option<usize> {
        self.buckets.iter().position(|b| {
            b.tranche_id == tranche_id && b.expiration_bucket_id == expiration_bucket_id
        })
    }

    /// Capacity in allocation units of each active tranche, in tranche order
    pub fn get_active_tranche_capacities(
        &self,
        pool: &StakingPool,
        now: i64,
        global_capacity_ratio: u128,
        capacity_reduction_ratio: u128,
    ) -> Result<Vec<u128>> {
        require!(
            capacity_reduction_ratio <= CAPACITY_REDUCTION_DENOMINATOR,
            StakingError::InvalidCapacityReduction
        );

        let multiplier = global_capacity_ratio
            .checked_mul(CAPACITY_REDUCTION_DENOMINATOR - capacity_reduction_ratio)
            .and_then(|m| m.checked_mul(self.weight as u128))
            .ok_or(StakingError::MathOverflow)?;
        let denominator =
            GLOBAL_CAPACITY_DENOMINATOR * CAPACITY_REDUCTION_DENOMINATOR * WEIGHT_DENOMINATOR;

        let first = StakingPool::first_active_tranche_id(now);
        (first..first.saturating_add(MAX_ACTIVE_TRANCHES))
            .map(|tranche_id| {
                let capacity = mul_div(pool.stake_in(tranche_id), multiplier, denominator)
                    .ok_or(StakingError::MathOverflow)?;
                Ok(capacity / NXM_PER_ALLOCATION_UNIT)
            })
            .collect()
    }

    /// Live allocated units of each active tranche, in tranche order
    pub fn get_active_allocations(&self, now: i64) -> Vec<u128> {
        let first = StakingPool::first_active_tranche_id(now);
        let mut allocations = vec![0u128; MAX_ACTIVE_TRANCHES as usize];

        for bucket in self.buckets.iter().filter(|b| Self::is_live(b, now)) {
            let offset = (bucket.tranche_id - first) as usize;
            if let Some(slot) = allocations.get_mut(offset) {
                *slot += bucket.allocated_amount as u128;
            }
        }
        allocations
    }

    /// Drop buckets past their expiration and buckets of expired tranches
    pub fn expire_buckets(&mut self, now: i64) -> Vec<TrancheBucket> {
        let (live, expired): (Vec<_>, Vec<_>) = std::mem::take(&mut self.buckets)
            .into_iter()
            .partition(|b| Self::is_live(b, now));
        self.buckets = live;
        expired
    }

    /// Per-tranche capacities and allocations of the active window, plus
    /// their totals over the tranches from `offset` on. Only those tranches
    /// can back the request.
    fn capacity_snapshot(
        &self,
        pool: &StakingPool,
        now: i64,
        offset: u32,
    ) -> Result<(Vec<u128>, Vec<u128>, u128, u128)> {
        let capacities = self.get_active_tranche_capacities(
            pool,
            now,
            pool.global_capacity_ratio as u128,
            self.capacity_reduction_ratio as u128,
        )?;
        let allocations = self.get_active_allocations(now);

        let eligible = offset as usize..MAX_ACTIVE_TRANCHES as usize;
        let total_capacity = capacities[eligible.clone()]
            .iter()
            .try_fold(0u128, |acc, c| acc.checked_add(*c))
            .ok_or(StakingError::MathOverflow)?;
        let initial_capacity_used = allocations[eligible].iter().sum::<u128>();

        Ok((capacities, allocations, total_capacity, initial_capacity_used))
    }

    /// Index in the active window of the first tranche that outlives a cover
    /// bought now plus the product's grace period
    fn first_eligible_offset(&self, now: i64, period: i64) -> Result<u32> {
        let claimable_until = now
            .checked_add(period)
            .and_then(|t| t.checked_add(self.grace_period))
            .ok_or(StakingError::MathOverflow)?;

        let first_active = StakingPool::first_active_tranche_id(now);
        let offset = tranche_id_at(claimable_until).saturating_sub(first_active);
        require!(offset < MAX_ACTIVE_TRANCHES, StakingError::InvalidCoverPeriod);
        Ok(offset)
    }

    fn validate_request(amount: u128, period: i64) -> Result<u128> {
        require!(
            (MIN_COVER_PERIOD..=MAX_COVER_PERIOD).contains(&period),
            StakingError::InvalidCoverPeriod
        );
        require!(amount > 0, StakingError::InvalidAmount);
        // sub-unit amounts are charged as a whole unit
        to_allocation_units(amount).ok_or(error!(StakingError::MathOverflow))
    }

    fn price(
        &self,
        units: u128,
        period: i64,
        initial_capacity_used: u128,
        total_capacity: u128,
        now: i64,
    ) -> Result<PremiumQuote> {
        if self.use_fixed_price {
            let premium_per_year =
                pricing::calculate_fixed_price_premium_per_year(self.target_price as u128, units)?;
            return Ok(PremiumQuote {
                units,
                premium: pricing::calculate_premium(premium_per_year, period)?,
                premium_per_year,
                surge_premium: 0,
                base_price: self.target_price as u128,
                next_price: self.next_price as u128,
            });
        }

        let base_price = self.base_price(now);
        let (premium_per_year, surge) = pricing::calculate_premium_per_year(
            base_price,
            units,
            initial_capacity_used,
            total_capacity,
        )?;
        let bump = pricing::calculate_price_bump(units, PRICE_BUMP_RATIO, total_capacity)?;

        Ok(PremiumQuote {
            units,
            premium: pricing::calculate_premium(premium_per_year, period)?,
            premium_per_year,
            surge_premium: surge.net(),
            base_price,
            next_price: base_price.checked_add(bump).ok_or(StakingError::MathOverflow)?,
        })
    }

    /// Premium a request would pay right now, without touching state
    pub fn calculate_premium(
        &self,
        pool: &StakingPool,
        amount: u128,
        period: i64,
        now: i64,
    ) -> Result<PremiumQuote> {
        let units = Self::validate_request(amount, period)?;
        let offset = self.first_eligible_offset(now, period)?;
        let (_, _, total_capacity, initial_capacity_used) =
            self.capacity_snapshot(pool, now, offset)?;
        require!(total_capacity > 0, StakingError::ZeroCapacity);

        self.price(units, period, initial_capacity_used, total_capacity, now)
    }

    /// Reserve capacity for a cover and move the price.
    ///
    /// Units go to the tranches that outlive the cover plus its grace period,
    /// earliest first, each filled up to its free capacity. Everything is
    /// validated before the first write, so a failed call leaves the product
    /// unchanged.
    pub fn allocate(
        &mut self,
        pool: &StakingPool,
        request: &AllocationRequest,
        now: i64,
    ) -> Result<AllocationOutcome> {
        let units = Self::validate_request(request.amount, request.period)?;
        let offset = self.first_eligible_offset(now, request.period)?;
        let (capacities, allocations, total_capacity, initial_capacity_used) =
            self.capacity_snapshot(pool, now, offset)?;
        require!(total_capacity > 0, StakingError::ZeroCapacity);

        let cover_end = now
            .checked_add(request.period)
            .ok_or(StakingError::MathOverflow)?;
        let first_active = StakingPool::first_active_tranche_id(now);
        let expiration_bucket_id = expiration_bucket_id(cover_end);

        let mut remaining = units;
        let mut plan = Vec::new();
        for i in offset as usize..MAX_ACTIVE_TRANCHES as usize {
            if remaining == 0 {
                break;
            }
            let free = capacities[i].saturating_sub(allocations[i]);
            let take = free.min(remaining);
            if take == 0 {
                continue;
            }

            let tranche_total = allocations[i]
                .checked_add(take)
                .ok_or(StakingError::AllocationOverflow)?;
            require!(
                tranche_total <= u32::MAX as u128,
                StakingError::AllocationOverflow
            );

            plan.push(TrancheAllocation {
                tranche_id: first_active + i as u32,
                amount: take as u32,
            });
            remaining -= take;
        }
        require!(remaining == 0, StakingError::InsufficientCapacity);

        let quote = self.price(units, request.period, initial_capacity_used, total_capacity, now)?;
        require!(
            quote.premium <= request.max_premium,
            StakingError::PremiumExceedsMax
        );
        let next_price = u64::try_from(quote.next_price).map_err(|_| StakingError::MathOverflow)?;

        // resolve every bucket write up front
        let mut writes = Vec::with_capacity(plan.len());
        let mut new_buckets = 0usize;
        for allocation in &plan {
            match self.bucket_index(allocation.tranche_id, expiration_bucket_id) {
                Some(j) => {
                    let amount = self.buckets[j]
                        .allocated_amount
                        .checked_add(allocation.amount)
                        .ok_or(StakingError::AllocationOverflow)?;
                    writes.push((Some(j), allocation.tranche_id, amount));
                }
                None => {
                    new_buckets += 1;
                    writes.push((None, allocation.tranche_id, allocation.amount));
                }
            }
        }
        require!(
            self.buckets.len() + new_buckets <= MAX_TRANCHE_BUCKETS,
            StakingError::TooManyBuckets
        );

        for (index, tranche_id, amount) in writes {
            match index {
                Some(j) => self.buckets[j].allocated_amount = amount,
                None => self.buckets.push(TrancheBucket {
                    tranche_id,
                    expiration_bucket_id,
                    allocated_amount: amount,
                }),
            }
        }

        if !self.use_fixed_price {
            self.next_price = next_price;
            self.last_update_time = now;
        }

        Ok(AllocationOutcome {
            quote,
            allocations: plan,
            expiration_bucket_id,
            total_capacity,
            initial_capacity_used,
        })
    }
}

/// Total units freed per expiration bucket id, ascending
pub fn group_by_bucket(expired: &[TrancheBucket]) -> Vec<(u32, u64)> {
    let mut grouped: Vec<(u32, u64)> = Vec::new();
    for bucket in expired {
        match grouped.iter_mut().find(|(id, _)| *id == bucket.expiration_bucket_id) {
            Some((_, total)) => *total += bucket.allocated_amount as u64,
            None => grouped.push((bucket.expiration_bucket_id, bucket.allocated_amount as u64)),
        }
    }
    grouped.sort_by_key(|(id, _)| *id);
    grouped
}
