//! # veld-token
//!
//! In-memory fungible-token ledger: the token-transfer collaborator the
//! core state machine settles against. Exact-amount semantics, no transfer
//! hooks — a transfer either moves the full amount or fails without
//! touching any balance.
//!
//! ## Modules
//!
//! - [`ledger`] — balances, allowances, mint/burn/transfer/transfer_from

pub mod ledger;

pub use ledger::TokenLedger;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token has not been registered.
    #[error("unknown token")]
    UnknownToken,

    /// Token is already registered.
    #[error("token exists")]
    TokenExists,

    /// The zero account is not a valid party.
    #[error("zero address")]
    ZeroAddress,

    /// Balance too low for the requested transfer or burn.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// Balance available.
        have: u64,
        /// Amount requested.
        need: u64,
    },

    /// Allowance too low for the requested transfer_from.
    #[error("insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance {
        /// Allowance available.
        have: u64,
        /// Amount requested.
        need: u64,
    },

    /// Balance would exceed `u64::MAX`.
    #[error("balance overflow")]
    Overflow,
}

/// Convenience result type for ledger operations.
pub type Result<T> = std::result::Result<T, TokenError>;
