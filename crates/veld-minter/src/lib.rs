//! # veld-minter
//!
//! The decaying weekly emission schedule.
//!
//! The minter emits a configured amount for the first processed epoch and
//! multiplies the stored weekly emission by `9,900/10,000` after each
//! payout, integer-floored per step: after `n` processed epochs the stored
//! emission is `E0 * 0.99^n`, step-rounded. A rollover attempt inside an
//! already-processed epoch is a no-op; the keeper hands the emitted amount
//! to the voter for distribution.
//!
//! ## Modules
//!
//! - [`schedule`] — the emission schedule state machine

pub mod schedule;

pub use schedule::Minter;

use veld_math::MathError;
use veld_types::roles::RoleError;

/// Error types for minter operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MinterError {
    /// Role check failed.
    #[error(transparent)]
    Role(#[from] RoleError),

    /// Arithmetic failure.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Convenience result type for minter operations.
pub type Result<T> = std::result::Result<T, MinterError>;
