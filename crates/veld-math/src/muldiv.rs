//! Widening multiply-then-divide and accrual-index helpers.
//!
//! The accrual index convention: a global `u128` index scaled by
//! `INDEX_SCALE = 10^18` advances by `amount * INDEX_SCALE / supply`;
//! a holder's payout over an index interval is
//! `balance * (index_now - index_checkpoint) / INDEX_SCALE`.

use crate::{MathError, Result};

/// Scale factor for accrual indices. Mirrors `veld_types::INDEX_SCALE`.
pub const INDEX_SCALE: u128 = 1_000_000_000_000_000_000;

/// Compute `a * b / denominator` with a `u128` intermediate, flooring.
///
/// # Errors
///
/// - [`MathError::DivisionByZero`] if `denominator` is zero
/// - [`MathError::Overflow`] if the quotient does not fit in `u64`
pub fn mul_div(a: u64, b: u64, denominator: u64) -> Result<u64> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let wide = a as u128 * b as u128 / denominator as u128;
    u64::try_from(wide).map_err(|_| MathError::Overflow)
}

/// Index advance for `amount` of new value spread over `supply` units:
/// `amount * INDEX_SCALE / supply`.
///
/// # Errors
///
/// - [`MathError::DivisionByZero`] if `supply` is zero
pub fn index_delta(amount: u64, supply: u64) -> Result<u128> {
    if supply == 0 {
        return Err(MathError::DivisionByZero);
    }
    // u64::MAX * INDEX_SCALE fits in u128, so the product cannot overflow.
    Ok(amount as u128 * INDEX_SCALE / supply as u128)
}

/// Payout for `balance` units over an index interval:
/// `balance * (index_now - index_checkpoint) / INDEX_SCALE`, flooring.
///
/// # Errors
///
/// - [`MathError::Overflow`] if `index_now < index_checkpoint` (the index
///   is monotone; a reversed interval indicates accounting corruption) or
///   the payout does not fit in `u64`
pub fn index_payout(balance: u64, index_now: u128, index_checkpoint: u128) -> Result<u64> {
    let delta = index_now
        .checked_sub(index_checkpoint)
        .ok_or(MathError::Overflow)?;
    let wide = (balance as u128)
        .checked_mul(delta)
        .ok_or(MathError::Overflow)?
        / INDEX_SCALE;
    u64::try_from(wide).map_err(|_| MathError::Overflow)
}
