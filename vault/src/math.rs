//! Checked fixed-point helpers.
//!
//! Reward accounting multiplies two `u128` quantities before dividing by a
//! third (`accrued × lock_amount / total`, `elapsed × rate / principal`). The
//! intermediate product can exceed `u128` long before the quotient does, so
//! [`mul_div`] carries it in 256 bits.

use crate::error::VaultError;

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two `u128`s as `(high, low)`.
fn wide_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LOW_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LOW_MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // Each term is < 2^64, so the sum fits comfortably.
    let mid = (ll >> 64) + (lh & LOW_MASK) + (hl & LOW_MASK);
    let low = (ll & LOW_MASK) | ((mid & LOW_MASK) << 64);
    let high = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (high, low)
}

/// `floor(a × b / denominator)` without intermediate overflow.
///
/// Returns `None` when `denominator` is zero or the quotient does not fit in
/// a `u128`.
pub fn checked_mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denominator);
    }

    let (high, low) = wide_mul(a, b);
    if high >= denominator {
        return None;
    }

    // Restoring long division of the 256-bit product, one bit at a time.
    let mut remainder = high;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= denominator {
            remainder = remainder.wrapping_sub(denominator);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// [`checked_mul_div`] that reports failure as [`VaultError::ArithmeticOverflow`].
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, VaultError> {
    checked_mul_div(a, b, denominator).ok_or(VaultError::ArithmeticOverflow)
}

pub fn add(a: u128, b: u128) -> Result<u128, VaultError> {
    a.checked_add(b).ok_or(VaultError::ArithmeticOverflow)
}

pub fn sub(a: u128, b: u128) -> Result<u128, VaultError> {
    a.checked_sub(b).ok_or(VaultError::ArithmeticOverflow)
}
