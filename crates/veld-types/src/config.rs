//! Protocol configuration.
//!
//! Policy constants — fee rates, fee bounds, epoch length, lock duration,
//! emission schedule — are configuration, not hard invariants. Defaults
//! match the original deployment parameters.

use serde::{Deserialize, Serialize};

use crate::{EPOCH_DURATION_SECS, MAX_LOCK_DURATION_SECS, UNITS_PER_TOKEN};

/// Complete protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Epoch length in seconds.
    #[serde(default = "default_epoch_length")]
    pub epoch_length: u64,
    /// Maximum lock duration in seconds.
    #[serde(default = "default_max_lock")]
    pub max_lock_duration: u64,
    /// Swap fee for stable pools, in units of 1/10,000 (5 = 0.05%).
    #[serde(default = "default_stable_fee")]
    pub stable_fee: u64,
    /// Swap fee for volatile pools, in units of 1/10,000 (30 = 0.30%).
    #[serde(default = "default_volatile_fee")]
    pub volatile_fee: u64,
    /// Lowest settable swap fee (0.01%).
    #[serde(default = "default_min_fee")]
    pub min_fee: u64,
    /// Highest settable swap fee (3%).
    #[serde(default = "default_max_fee")]
    pub max_fee: u64,
    /// Emission decay numerator (per-epoch multiplier is num/den).
    #[serde(default = "default_decay_num")]
    pub emission_decay_num: u64,
    /// Emission decay denominator.
    #[serde(default = "default_decay_den")]
    pub emission_decay_den: u64,
    /// Governance-token emission for the first processed epoch, in base units.
    #[serde(default = "default_initial_emission")]
    pub initial_weekly_emission: u64,
    /// Liquidity shares permanently locked on a pool's first deposit.
    #[serde(default = "default_minimum_liquidity")]
    pub minimum_liquidity: u64,
}

fn default_epoch_length() -> u64 {
    EPOCH_DURATION_SECS
}

fn default_max_lock() -> u64 {
    MAX_LOCK_DURATION_SECS
}

fn default_stable_fee() -> u64 {
    5
}

fn default_volatile_fee() -> u64 {
    30
}

fn default_min_fee() -> u64 {
    1
}

fn default_max_fee() -> u64 {
    300
}

fn default_decay_num() -> u64 {
    9_900
}

fn default_decay_den() -> u64 {
    10_000
}

fn default_initial_emission() -> u64 {
    // 50,000 tokens per week.
    50_000 * UNITS_PER_TOKEN
}

fn default_minimum_liquidity() -> u64 {
    1_000
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            epoch_length: default_epoch_length(),
            max_lock_duration: default_max_lock(),
            stable_fee: default_stable_fee(),
            volatile_fee: default_volatile_fee(),
            min_fee: default_min_fee(),
            max_fee: default_max_fee(),
            emission_decay_num: default_decay_num(),
            emission_decay_den: default_decay_den(),
            initial_weekly_emission: default_initial_emission(),
            minimum_liquidity: default_minimum_liquidity(),
        }
    }
}

impl ProtocolConfig {
    /// The epoch index containing `now`.
    pub fn epoch_of(&self, now: u64) -> u64 {
        now / self.epoch_length
    }

    /// The start timestamp of the epoch containing `now`.
    pub fn epoch_start(&self, now: u64) -> u64 {
        now - (now % self.epoch_length)
    }
}
