//! # veld-gauge
//!
//! Per-pool staking of liquidity shares with reward-per-token accrual.
//!
//! A gauge stakes one pool's liquidity shares and streams emission rewards
//! to stakers proportional to stake. A global reward-per-token accumulator
//! advances with elapsed time and the current reward rate; each staker
//! carries a paid-through checkpoint, so earned rewards are computed from
//! a single subtraction instead of iterating over time.
//!
//! ## Modules
//!
//! - [`staking`] — the gauge state machine

pub mod staking;

pub use staking::Gauge;

use veld_math::MathError;
use veld_pool::PoolError;
use veld_token::TokenError;

/// Error types for gauge operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GaugeError {
    /// Stake or unstake amount is zero.
    #[error("zero amount")]
    ZeroAmount,

    /// Staked balance too low for the requested withdrawal.
    #[error("insufficient stake: have {have}, need {need}")]
    InsufficientStake {
        /// Staked balance available.
        have: u64,
        /// Amount requested.
        need: u64,
    },

    /// Liquidity-share movement failed.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Token ledger failure.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Arithmetic failure.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Convenience result type for gauge operations.
pub type Result<T> = std::result::Result<T, GaugeError>;
