//! # veld-escrow
//!
//! Vote-escrowed lock positions over the governance token.
//!
//! Locking mints a position whose voting power decays linearly with the
//! remaining lock time: `amount * (unlock_time - now) / max_lock_duration`,
//! zero once expired. Positions are opaque ids with exclusive, transferable
//! ownership; they can be increased, extended, merged, and withdrawn after
//! expiry.
//!
//! ## Modules
//!
//! - [`escrow`] — the position store and lock operations

pub mod escrow;

pub use escrow::{Lock, VotingEscrow};

use veld_math::MathError;
use veld_token::TokenError;
use veld_types::PositionId;

/// Error types for escrow operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EscrowError {
    /// Unlock time is not in the future.
    #[error("bad time: unlock {unlock} not after {now}")]
    UnlockInPast {
        /// Requested unlock time.
        unlock: u64,
        /// Current time.
        now: u64,
    },

    /// Lock duration exceeds the maximum.
    #[error("exceeds max lock: unlock {unlock}, latest allowed {latest}")]
    ExceedsMaxLock {
        /// Requested unlock time.
        unlock: u64,
        /// Latest allowed unlock time.
        latest: u64,
    },

    /// A new unlock time must extend the current one.
    #[error("unlock not extended: current {current}, requested {requested}")]
    UnlockNotLater {
        /// Current unlock time.
        current: u64,
        /// Requested unlock time.
        requested: u64,
    },

    /// Lock amount is zero.
    #[error("zero amount")]
    ZeroAmount,

    /// No position under this id.
    #[error("unknown position {position}")]
    UnknownPosition {
        /// The id that failed to resolve.
        position: PositionId,
    },

    /// Caller does not own the position.
    #[error("not owner of position {position}")]
    NotOwner {
        /// The position in question.
        position: PositionId,
    },

    /// Merge source and target are the same position.
    #[error("same position")]
    SamePosition,

    /// Merge source holds nothing.
    #[error("empty position {position}")]
    EmptyPosition {
        /// The empty source.
        position: PositionId,
    },

    /// Lock has already expired.
    #[error("lock expired: position {position}")]
    LockExpired {
        /// The expired position.
        position: PositionId,
    },

    /// Lock has not expired yet.
    #[error("not expired: unlock {unlock}, now {now}")]
    NotExpired {
        /// Unlock time of the position.
        unlock: u64,
        /// Current time.
        now: u64,
    },

    /// The zero account is not a valid party.
    #[error("zero address")]
    ZeroAddress,

    /// Arithmetic failure.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Token ledger failure.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Convenience result type for escrow operations.
pub type Result<T> = std::result::Result<T, EscrowError>;
