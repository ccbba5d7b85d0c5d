//! # veld-exchange
//!
//! The public operation surface of the protocol: one [`Exchange`] value
//! owns the token ledger, the pool factory, the voting escrow, the voter,
//! and the minter, and routes every caller-facing operation to the right
//! component. All methods take `&mut self` and an explicit `now`
//! timestamp, so state transitions are serial, deterministic, and
//! structurally non-reentrant; a failed nested call surfaces its error
//! before any state is touched.
//!
//! ## Modules
//!
//! - [`exchange`] — the facade and the epoch-rollover orchestration
//! - [`config`] — TOML configuration loading

pub mod config;
pub mod exchange;

pub use exchange::Exchange;

use veld_escrow::EscrowError;
use veld_gauge::GaugeError;
use veld_minter::MinterError;
use veld_pool::PoolError;
use veld_token::TokenError;
use veld_voter::VoterError;

/// Error types for facade operations.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// Pool subsystem failure.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Escrow subsystem failure.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// Voter subsystem failure.
    #[error(transparent)]
    Voter(#[from] VoterError),

    /// Gauge subsystem failure.
    #[error(transparent)]
    Gauge(#[from] GaugeError),

    /// Minter subsystem failure.
    #[error(transparent)]
    Minter(#[from] MinterError),

    /// Token ledger failure.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Configuration could not be read or parsed.
    #[error("invalid config: {0}")]
    Config(String),
}

/// Convenience result type for facade operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;
