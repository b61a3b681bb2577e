// programs/cairn_staking/src/pricing.rs
//
// Premium and price curves. Prices are ratios over INITIAL_PRICE_DENOMINATOR,
// capacities and amounts are allocation units, premiums are token base units.
// Results must match an independent reference bit for bit, so every division
// floors except the price bump, which rounds up.

use crate::errors::StakingError;
use anchor_lang::prelude::*;
use cairn_core::pricing::{
    INITIAL_PRICE_DENOMINATOR, SURGE_PRICE_RATIO, SURGE_THRESHOLD_DENOMINATOR,
    SURGE_THRESHOLD_RATIO, TARGET_PRICE_DENOMINATOR,
};
use cairn_core::staking::{ALLOCATION_UNITS_PER_NXM, NXM_PER_ALLOCATION_UNIT};
use cairn_core::time::{ONE_DAY, ONE_YEAR};
use cairn_core::{div_ceil, mul_div};

/// Surge charged for a request, split into the gross amount for the final
/// utilisation and the part already paid by earlier allocations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurgePremiums {
    pub surge_premium: u128,
    pub surge_premium_skipped: u128,
}

impl SurgePremiums {
    /// What this request actually pays
    pub fn net(&self) -> u128 {
        self.surge_premium.saturating_sub(self.surge_premium_skipped)
    }
}

/// Linear decay from `next_price` towards `target_price`, floored at the target
pub fn calculate_base_price(
    next_price: u128,
    target_price: u128,
    last_update_time: i64,
    now: i64,
    price_change_per_day: u128,
) -> u128 {
    let elapsed = now.saturating_sub(last_update_time).max(0) as u128;
    let price_drop = price_change_per_day.saturating_mul(elapsed) / ONE_DAY as u128;
    next_price.saturating_sub(price_drop).max(target_price)
}

/// Surge premium for `amount_on_surge` units above the surge threshold:
/// the area under a price line that starts at 0 at the threshold and grows
/// by SURGE_PRICE_RATIO per unit of utilisation.
pub fn calculate_surge_premium(amount_on_surge: u128, total_capacity: u128) -> Result<u128> {
    require!(total_capacity > 0, StakingError::ZeroCapacity);

    let scaled = amount_on_surge
        .checked_mul(SURGE_PRICE_RATIO)
        .ok_or(StakingError::MathOverflow)?;
    let surge = mul_div(scaled, amount_on_surge, total_capacity).ok_or(StakingError::MathOverflow)?;

    Ok(surge / 2 / ALLOCATION_UNITS_PER_NXM)
}

pub fn calculate_surge_premiums(
    amount: u128,
    initial_capacity_used: u128,
    total_capacity: u128,
) -> Result<SurgePremiums> {
    require!(total_capacity > 0, StakingError::ZeroCapacity);

    let surge_start = mul_div(total_capacity, SURGE_THRESHOLD_RATIO, SURGE_THRESHOLD_DENOMINATOR)
        .ok_or(StakingError::MathOverflow)?;
    let final_capacity_used = initial_capacity_used
        .checked_add(amount)
        .ok_or(StakingError::MathOverflow)?;

    if final_capacity_used <= surge_start {
        return Ok(SurgePremiums::default());
    }

    let amount_on_surge = final_capacity_used - surge_start;
    let amount_on_surge_skipped = initial_capacity_used.saturating_sub(surge_start);

    Ok(SurgePremiums {
        surge_premium: calculate_surge_premium(amount_on_surge, total_capacity)?,
        surge_premium_skipped: calculate_surge_premium(amount_on_surge_skipped, total_capacity)?,
    })
}

/// Yearly premium for `amount` allocation units at `base_price`, plus surge.
/// Returns the surge split alongside so callers can report it.
pub fn calculate_premium_per_year(
    base_price: u128,
    amount: u128,
    initial_capacity_used: u128,
    total_capacity: u128,
) -> Result<(u128, SurgePremiums)> {
    let base_premium = amount
        .checked_mul(NXM_PER_ALLOCATION_UNIT)
        .and_then(|a| mul_div(a, base_price, INITIAL_PRICE_DENOMINATOR))
        .ok_or(StakingError::MathOverflow)?;

    let surge = calculate_surge_premiums(amount, initial_capacity_used, total_capacity)?;
    let premium_per_year = base_premium
        .checked_add(surge.net())
        .ok_or(StakingError::MathOverflow)?;

    Ok((premium_per_year, surge))
}

/// Fixed-price products pay the target price and never surge
pub fn calculate_fixed_price_premium_per_year(target_price: u128, amount: u128) -> Result<u128> {
    amount
        .checked_mul(NXM_PER_ALLOCATION_UNIT)
        .and_then(|a| mul_div(a, target_price, TARGET_PRICE_DENOMINATOR))
        .ok_or(error!(StakingError::MathOverflow))
}

/// Price increase caused by buying `amount` of `total_capacity`, rounded up
pub fn calculate_price_bump(amount: u128, price_bump_ratio: u128, total_capacity: u128) -> Result<u128> {
    require!(total_capacity > 0, StakingError::ZeroCapacity);

    let scaled = price_bump_ratio
        .checked_mul(amount)
        .ok_or(StakingError::MathOverflow)?;
    div_ceil(scaled, total_capacity).ok_or(error!(StakingError::MathOverflow))
}

/// Pro-rate a yearly premium to the cover period
pub fn calculate_premium(premium_per_year: u128, period: i64) -> Result<u128> {
    require!(period >= 0, StakingError::InvalidCoverPeriod);
    mul_div(premium_per_year, period as u128, ONE_YEAR as u128).ok_or(error!(StakingError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::pricing::{PRICE_BUMP_RATIO, PRICE_CHANGE_PER_DAY};
    use cairn_core::staking::ONE_NXM;
    use proptest::prelude::*;

    const TOTAL_CAPACITY: u128 = 10_000_000; // 100k tokens in allocation units

    fn units(tokens: u128) -> u128 {
        tokens * ONE_NXM / NXM_PER_ALLOCATION_UNIT
    }

    // ==================== BASE PRICE ====================

    #[test]
    fn test_base_price_decays_per_day() {
        let last = 1_000_000;
        assert_eq!(calculate_base_price(2_000, 200, last, last, PRICE_CHANGE_PER_DAY), 2_000);
        assert_eq!(calculate_base_price(2_000, 200, last, last + ONE_DAY, PRICE_CHANGE_PER_DAY), 1_950);
        // partial days decay proportionally
        assert_eq!(calculate_base_price(2_000, 200, last, last + ONE_DAY / 2, PRICE_CHANGE_PER_DAY), 1_975);
    }

    #[test]
    fn test_base_price_floors_at_target() {
        let last = 0;
        let now = 183 * ONE_DAY;
        assert_eq!(calculate_base_price(2_000, 200, last, now, PRICE_CHANGE_PER_DAY), 200);
        assert_eq!(calculate_base_price(150, 200, last, last, PRICE_CHANGE_PER_DAY), 200);
    }

    #[test]
    fn test_base_price_ignores_clock_going_backwards() {
        assert_eq!(calculate_base_price(2_000, 200, 500, 100, PRICE_CHANGE_PER_DAY), 2_000);
    }

    // ==================== PREMIUM ====================

    #[test]
    fn test_premium_without_surge() {
        let (premium_per_year, surge) =
            calculate_premium_per_year(200, units(4_800), 0, TOTAL_CAPACITY).unwrap();
        assert_eq!(premium_per_year, 96 * ONE_NXM);
        assert_eq!(surge, SurgePremiums::default());

        let quarter = ONE_YEAR / 4;
        assert_eq!(calculate_premium(premium_per_year, quarter).unwrap(), 24 * ONE_NXM);
        assert_eq!(calculate_premium(premium_per_year, ONE_YEAR).unwrap(), 96 * ONE_NXM);
    }

    #[test]
    fn test_single_unit_premium() {
        let (premium_per_year, _) = calculate_premium_per_year(2_000, 1, 0, TOTAL_CAPACITY).unwrap();
        assert_eq!(premium_per_year, 2 * ONE_NXM / 1_000);
    }

    #[test]
    fn test_surge_for_full_capacity_purchase() {
        let surge = calculate_surge_premiums(TOTAL_CAPACITY, 0, TOTAL_CAPACITY).unwrap();
        assert_eq!(surge.surge_premium, 1_000 * ONE_NXM);
        assert_eq!(surge.surge_premium_skipped, 0);
    }

    #[test]
    fn test_surge_skips_what_earlier_buyers_paid() {
        // capacity used goes 92.8% -> 97.6%
        let surge = calculate_surge_premiums(units(4_800), units(92_800), TOTAL_CAPACITY).unwrap();
        assert_eq!(surge.surge_premium, 5_776 * ONE_NXM / 10);
        assert_eq!(surge.surge_premium_skipped, 784 * ONE_NXM / 10);
        assert_eq!(surge.net(), 4_992 * ONE_NXM / 10);
    }

    #[test]
    fn test_premium_per_year_includes_net_surge() {
        let (premium_per_year, surge) =
            calculate_premium_per_year(200, units(4_800), units(92_800), TOTAL_CAPACITY).unwrap();
        assert_eq!(surge.net(), 4_992 * ONE_NXM / 10);
        assert_eq!(premium_per_year, 96 * ONE_NXM + surge.net());
    }

    #[test]
    fn test_no_surge_below_threshold() {
        let surge = calculate_surge_premiums(units(10_000), units(80_000), TOTAL_CAPACITY).unwrap();
        assert_eq!(surge, SurgePremiums::default());
    }

    #[test]
    fn test_zero_capacity_is_an_error() {
        assert!(calculate_surge_premiums(1, 0, 0).is_err());
        assert!(calculate_premium_per_year(200, 1, 0, 0).is_err());
        assert!(calculate_price_bump(1, PRICE_BUMP_RATIO, 0).is_err());
    }

    #[test]
    fn test_fixed_price_premium() {
        let premium_per_year = calculate_fixed_price_premium_per_year(200, units(4_800)).unwrap();
        assert_eq!(premium_per_year, 96 * ONE_NXM);
    }

    // ==================== PRICE BUMP ====================

    #[test]
    fn test_price_bump_rounds_up() {
        assert_eq!(calculate_price_bump(units(4_800), PRICE_BUMP_RATIO, TOTAL_CAPACITY).unwrap(), 96);
        assert_eq!(calculate_price_bump(units(24_000), PRICE_BUMP_RATIO, TOTAL_CAPACITY).unwrap(), 480);
        // a single unit still moves the price
        assert_eq!(calculate_price_bump(1, PRICE_BUMP_RATIO, TOTAL_CAPACITY).unwrap(), 1);
        assert_eq!(calculate_price_bump(0, PRICE_BUMP_RATIO, TOTAL_CAPACITY).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn prop_base_price_never_below_target(
            next_price in 0u128..20_000,
            target_price in 1u128..10_000,
            elapsed in 0i64..(10 * ONE_YEAR),
        ) {
            let price = calculate_base_price(next_price, target_price, 0, elapsed, PRICE_CHANGE_PER_DAY);
            prop_assert!(price >= target_price);
        }

        #[test]
        fn prop_base_price_non_increasing(
            next_price in 0u128..20_000,
            target_price in 1u128..10_000,
            t1 in 0i64..ONE_YEAR,
            dt in 0i64..ONE_YEAR,
        ) {
            let earlier = calculate_base_price(next_price, target_price, 0, t1, PRICE_CHANGE_PER_DAY);
            let later = calculate_base_price(next_price, target_price, 0, t1 + dt, PRICE_CHANGE_PER_DAY);
            prop_assert!(later <= earlier);
        }

        #[test]
        fn prop_price_bump_monotonic(
            total in 1u128..(u32::MAX as u128),
            a in 0u128..(u32::MAX as u128),
            extra in 0u128..(u32::MAX as u128),
        ) {
            let low = calculate_price_bump(a, PRICE_BUMP_RATIO, total).unwrap();
            let high = calculate_price_bump(a + extra, PRICE_BUMP_RATIO, total).unwrap();
            prop_assert!(high >= low);

            // one full bump step apart means a strictly higher bump
            let step = div_ceil(total, PRICE_BUMP_RATIO).unwrap();
            let stepped = calculate_price_bump(a + step, PRICE_BUMP_RATIO, total).unwrap();
            prop_assert!(stepped > low);
        }

        #[test]
        fn prop_surge_bounded_by_max_rate(
            tenths in 1u128..100_000_000,
            used_bps in 0u128..10_000,
            request_bps in 1u128..10_000,
        ) {
            let total = tenths * 10;
            let initial = total * used_bps / 10_000;
            let amount = (total - initial) * request_bps / 10_000;
            prop_assume!(amount > 0);

            let surge = calculate_surge_premiums(amount, initial, total).unwrap();
            // marginal surge rate tops out at 20% at full capacity
            let cap = amount * NXM_PER_ALLOCATION_UNIT * 20 / 100;
            prop_assert!(surge.net() <= cap);

            let surge_start = total * 9 / 10;
            if initial + amount > surge_start {
                prop_assert!(surge.net() > 0);
            } else {
                prop_assert_eq!(surge.net(), 0);
            }
        }
    }
}
