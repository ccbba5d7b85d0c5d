//! # veld-bribe
//!
//! Epoch-bucketed third-party incentives for voters.
//!
//! A bribe instance belongs to one pool. Depositors fund a `(pool, epoch)`
//! bucket; positions that voted for the pool during that epoch claim a
//! pro-rata share once the epoch has closed, each position at most once
//! per epoch.
//!
//! ## Modules
//!
//! - [`epochs`] — the per-epoch bucket store

pub mod epochs;

pub use epochs::Bribe;

use veld_math::MathError;
use veld_token::TokenError;
use veld_types::{EpochIndex, PositionId};

/// Error types for bribe operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BribeError {
    /// The epoch has not closed yet.
    #[error("epoch not ended: epoch {epoch} ends at {ends_at}, now {now}")]
    EpochNotEnded {
        /// Epoch being claimed.
        epoch: EpochIndex,
        /// Timestamp at which the epoch closes.
        ends_at: u64,
        /// Current time.
        now: u64,
    },

    /// The position recorded no votes for this pool in this epoch.
    #[error("no votes to claim: position {position}, epoch {epoch}")]
    NoVotes {
        /// The claiming position.
        position: PositionId,
        /// The epoch in question.
        epoch: EpochIndex,
    },

    /// The position already claimed this epoch's bucket.
    #[error("already claimed: position {position}, epoch {epoch}")]
    AlreadyClaimed {
        /// The claiming position.
        position: PositionId,
        /// The epoch in question.
        epoch: EpochIndex,
    },

    /// The epoch bucket holds no reward.
    #[error("no bribe to claim")]
    NothingToClaim,

    /// Deposit amount is zero.
    #[error("zero amount")]
    ZeroAmount,

    /// Arithmetic failure.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Token ledger failure.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Convenience result type for bribe operations.
pub type Result<T> = std::result::Result<T, BribeError>;
