//! # veld-math
//!
//! Exact integer arithmetic with explicit rounding rules. All token
//! amounts are `u64`; every intermediate product widens to `u128` so that
//! multiplication never overflows silently. Division always floors —
//! payouts round down, never up.
//!
//! ## Modules
//!
//! - [`muldiv`] — widening multiply-then-divide and accrual-index helpers
//! - [`sqrt`] — integer square root

pub mod muldiv;
pub mod sqrt;

pub use muldiv::{index_delta, index_payout, mul_div};
pub use sqrt::isqrt_u128;

/// Error types for arithmetic operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MathError {
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Result does not fit in the target width.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Convenience result type for arithmetic operations.
pub type Result<T> = std::result::Result<T, MathError>;
