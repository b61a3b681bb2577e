// programs/cairn_core/src/math.rs
//
// Integer helpers. All divisions round down unless the name says otherwise.
// None means overflow or a zero denominator; callers map it to their own error.

use crate::staking::NXM_PER_ALLOCATION_UNIT;

/// a / b rounded up
pub fn div_ceil(a: u128, b: u128) -> Option<u128> {
    if b == 0 {
        return None;
    }
    let quotient = a / b;
    if a % b == 0 {
        Some(quotient)
    } else {
        quotient.checked_add(1)
    }
}

/// floor(x * y / denominator) without the x * y intermediate.
///
/// Splits x = q * denominator + r so that the result is q * y + r * y / denominator,
/// which is exact as long as r * y fits in u128.
pub fn mul_div(x: u128, y: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let q = x / denominator;
    let r = x % denominator;
    let whole = q.checked_mul(y)?;
    let fraction = r.checked_mul(y)? / denominator;
    whole.checked_add(fraction)
}

/// Token amount -> allocation units, rounded up so that any non-zero amount
/// costs at least one unit
pub fn to_allocation_units(amount: u128) -> Option<u128> {
    div_ceil(amount, NXM_PER_ALLOCATION_UNIT)
}
