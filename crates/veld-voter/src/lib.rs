//! # veld-voter
//!
//! Per-epoch vote allocation and emission fan-out.
//!
//! Lock positions allocate their live voting power across pools; the
//! running pool aggregates convert votes into normalized weights. Once per
//! epoch the keeper distributes the emission across pools proportional to
//! `pool_weight / total_weight`, topping up each pool's gauge. Bribe
//! deposits are routed to the target pool's epoch bucket and claimed back
//! through the voter, which checks position ownership.
//!
//! ## Modules
//!
//! - [`voter`] — vote records, distribution, bribe routing

pub mod voter;

pub use voter::Voter;

use veld_bribe::BribeError;
use veld_escrow::EscrowError;
use veld_gauge::GaugeError;
use veld_math::MathError;
use veld_token::TokenError;
use veld_types::roles::RoleError;
use veld_types::{EpochIndex, PoolId, PositionId};

/// Error types for voter operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VoterError {
    /// Caller does not own the voting position.
    #[error("not owner of position {position}")]
    NotPositionOwner {
        /// The position in question.
        position: PositionId,
    },

    /// Pool and weight vectors differ in length.
    #[error("length mismatch: {pools} pools, {weights} weights")]
    LengthMismatch {
        /// Number of pools supplied.
        pools: usize,
        /// Number of weights supplied.
        weights: usize,
    },

    /// A vote needs at least one pool.
    #[error("empty vote")]
    EmptyVote,

    /// The same pool appears twice in one vote.
    #[error("duplicate pool {pool}")]
    DuplicatePool {
        /// The repeated pool.
        pool: PoolId,
    },

    /// A vote entry carries zero weight.
    #[error("zero weight")]
    ZeroWeight,

    /// No gauge is registered for this pool.
    #[error("unknown pool {pool}")]
    UnknownPool {
        /// The unresolved pool.
        pool: PoolId,
    },

    /// A gauge and bribe already exist for this pool.
    #[error("already registered: pool {pool}")]
    AlreadyRegistered {
        /// The pool in question.
        pool: PoolId,
    },

    /// Requested weight exceeds the position's voting power.
    #[error("exceeds power: requested {requested}, power {power}")]
    ExceedsPower {
        /// Total weight requested.
        requested: u64,
        /// Live voting power at vote time.
        power: u64,
    },

    /// This epoch's emission has already been distributed.
    #[error("already distributed: epoch {epoch}")]
    AlreadyDistributed {
        /// The epoch in question.
        epoch: EpochIndex,
    },

    /// No votes have been cast; nothing to distribute against.
    #[error("no votes")]
    NoVotes,

    /// Bribes cannot fund an epoch that has already passed.
    #[error("cannot backdate: epoch {epoch}, current {current}")]
    BackdatedEpoch {
        /// The requested epoch.
        epoch: EpochIndex,
        /// The current epoch.
        current: EpochIndex,
    },

    /// Amount is zero.
    #[error("zero amount")]
    ZeroAmount,

    /// Role check failed.
    #[error(transparent)]
    Role(#[from] RoleError),

    /// Escrow lookup failed.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// Gauge operation failed.
    #[error(transparent)]
    Gauge(#[from] GaugeError),

    /// Bribe operation failed.
    #[error(transparent)]
    Bribe(#[from] BribeError),

    /// Token ledger failure.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Arithmetic failure.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Convenience result type for voter operations.
pub type Result<T> = std::result::Result<T, VoterError>;
