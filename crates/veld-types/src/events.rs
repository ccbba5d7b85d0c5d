//! Protocol events.
//!
//! Every state transition that an observer needs to reconstruct the ledger
//! is recorded as an [`Event`]. Components append to their own
//! [`EventJournal`]; a log consumer drains journals after each operation.

use serde::{Deserialize, Serialize};

use crate::{AccountId, EpochIndex, PoolId, PositionId, TokenId};

/// All protocol events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "data")]
pub enum Event {
    // Pool lifecycle
    PoolCreated {
        pool: PoolId,
        token_a: TokenId,
        token_b: TokenId,
        stable: bool,
    },
    Mint {
        pool: PoolId,
        to: AccountId,
        amount_a: u64,
        amount_b: u64,
        shares: u64,
    },
    Burn {
        pool: PoolId,
        to: AccountId,
        amount_a: u64,
        amount_b: u64,
        shares: u64,
    },
    Swap {
        pool: PoolId,
        to: AccountId,
        amount_a_in: u64,
        amount_b_in: u64,
        amount_a_out: u64,
        amount_b_out: u64,
    },
    Sync {
        pool: PoolId,
        reserve_a: u64,
        reserve_b: u64,
    },
    FeesClaimed {
        pool: PoolId,
        holder: AccountId,
        to: AccountId,
        amount_a: u64,
        amount_b: u64,
    },

    // Escrow lifecycle
    LockCreated {
        position: PositionId,
        owner: AccountId,
        amount: u64,
        unlock_time: u64,
    },
    LockIncreased {
        position: PositionId,
        amount: u64,
    },
    LockExtended {
        position: PositionId,
        unlock_time: u64,
    },
    LockMerged {
        from: PositionId,
        into: PositionId,
        amount: u64,
        unlock_time: u64,
    },
    LockWithdrawn {
        position: PositionId,
        owner: AccountId,
        amount: u64,
    },
    LockTransferred {
        position: PositionId,
        from: AccountId,
        to: AccountId,
    },

    // Voting and distribution
    VoteCast {
        position: PositionId,
        epoch: EpochIndex,
        pool: PoolId,
        weight: u64,
    },
    VoteReset {
        position: PositionId,
        epoch: EpochIndex,
    },
    EmissionDistributed {
        epoch: EpochIndex,
        pool: PoolId,
        amount: u64,
    },
    GaugeDeposit {
        pool: PoolId,
        staker: AccountId,
        amount: u64,
    },
    GaugeWithdraw {
        pool: PoolId,
        staker: AccountId,
        amount: u64,
    },
    GaugeRewardPaid {
        pool: PoolId,
        staker: AccountId,
        amount: u64,
    },
    BribeDeposited {
        pool: PoolId,
        epoch: EpochIndex,
        amount: u64,
    },
    BribeClaimed {
        pool: PoolId,
        epoch: EpochIndex,
        position: PositionId,
        amount: u64,
    },
    EmissionAdvanced {
        epoch_start: u64,
        emitted: u64,
        next_weekly: u64,
    },

    // Administration
    PauseSet {
        paused: bool,
    },
    FeeUpdated {
        stable: bool,
        fee: u64,
    },
    PoolAdminChanged {
        admin: AccountId,
    },
    PauserChanged {
        pauser: AccountId,
    },
    FeeManagerChanged {
        fee_manager: AccountId,
    },
    KeeperChanged {
        keeper: AccountId,
    },
}

/// Append-only event journal owned by a component.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventJournal {
    entries: Vec<Event>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn record(&mut self, event: Event) {
        self.entries.push(event);
    }

    /// All recorded events, oldest first.
    pub fn entries(&self) -> &[Event] {
        &self.entries
    }

    /// Remove and return all recorded events.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.entries)
    }
}
