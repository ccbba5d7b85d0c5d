//! # veld-pool
//!
//! Constant-product liquidity pools with per-share fee accrual and a
//! deterministic pool registry.
//!
//! A pool holds two token reserves and a fungible liquidity-share ledger.
//! Deposits are measured as the difference between the pool account's
//! actual token balances and its last-known reserves, so callers transfer
//! in first and then call `mint`/`swap`/`burn`. Swap fees are diverted to
//! a per-pool fee collector and accrued to share holders through a
//! monotone fees-per-share index.
//!
//! ## Modules
//!
//! - [`fees`] — fees-per-share accrual and checkpointed claims
//! - [`pool`] — mint/burn/swap/quote/sync over a reserve pair
//! - [`factory`] — registry keyed by (token pair, stable flag), roles, pause

pub mod factory;
pub mod fees;
pub mod pool;

pub use factory::PoolFactory;
pub use fees::PoolFees;
pub use pool::Pool;

use veld_math::MathError;
use veld_token::TokenError;
use veld_types::roles::RoleError;
use veld_types::PoolId;

/// Error types for pool operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PoolError {
    /// Mint and swap are blocked while paused. Burn never is.
    #[error("paused")]
    Paused,

    /// Pool creation is blocked while the factory is paused.
    #[error("factory paused")]
    FactoryPaused,

    /// A pool needs two distinct tokens.
    #[error("same token")]
    SameToken,

    /// The zero account is not a valid party.
    #[error("zero address")]
    ZeroAddress,

    /// A pool for this pair and stability already exists.
    #[error("pool exists")]
    PoolExists,

    /// No pool registered under this id.
    #[error("unknown pool {pool}")]
    UnknownPool {
        /// The id that failed to resolve.
        pool: PoolId,
    },

    /// Fee outside the configured bounds.
    #[error("invalid fee: {fee}")]
    InvalidFee {
        /// The rejected fee, in units of 1/10,000.
        fee: u64,
    },

    /// Deposit too small to mint any shares, or swap output exceeds the
    /// reserve.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// No shares were transferred to the pool before `burn`, or the held
    /// shares redeem to nothing.
    #[error("insufficient burn")]
    InsufficientBurn,

    /// Exactly one swap output must be nonzero.
    #[error("invalid out")]
    InvalidOut,

    /// Swap output cannot go to the zero account or a pool-owned account.
    #[error("invalid to")]
    InvalidTo,

    /// No net input tokens were received for the swap.
    #[error("no input")]
    NoInput,

    /// The constant-product invariant would decrease net of fees.
    #[error("K invariant violated")]
    KInvariant,

    /// Quote requested for a zero input amount.
    #[error("zero input")]
    ZeroInput,

    /// Token is not one of the pool's pair.
    #[error("invalid token")]
    InvalidToken,

    /// Share balance too low for the requested transfer.
    #[error("insufficient shares: have {have}, need {need}")]
    InsufficientShares {
        /// Shares available.
        have: u64,
        /// Shares requested.
        need: u64,
    },

    /// Nothing accrued to claim.
    #[error("no fees to claim")]
    NoFeesToClaim,

    /// Role check failed.
    #[error(transparent)]
    Role(#[from] RoleError),

    /// Arithmetic failure.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Token ledger failure.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Convenience result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
