//! The per-epoch bucket store.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use veld_math::{mul_div, MathError};
use veld_token::TokenLedger;
use veld_types::events::{Event, EventJournal};
use veld_types::{
    account_domain, derived_account, AccountId, EpochIndex, PoolId, PositionId, TokenId,
};

use crate::{BribeError, Result};

/// One epoch's bucket: deposited reward, recorded votes, and claims.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct EpochBucket {
    reward: u64,
    total_weight: u64,
    votes: HashMap<PositionId, u64>,
    claimed: HashSet<PositionId>,
}

/// Bribe state for one pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bribe {
    pool: PoolId,
    account: AccountId,
    reward_token: TokenId,
    epoch_length: u64,
    epochs: HashMap<EpochIndex, EpochBucket>,
    journal: EventJournal,
}

impl Bribe {
    /// Create the bribe store for `pool`, paying out `reward_token`.
    pub fn new(pool: PoolId, reward_token: TokenId, epoch_length: u64) -> Self {
        Self {
            pool,
            account: derived_account(account_domain::BRIBE, pool),
            reward_token,
            epoch_length,
            epochs: HashMap::new(),
            journal: EventJournal::new(),
        }
    }

    pub fn pool(&self) -> PoolId {
        self.pool
    }

    /// The bribe's token account; deposits are custodied here.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Reward deposited for `epoch`.
    pub fn reward_at(&self, epoch: EpochIndex) -> u64 {
        self.epochs.get(&epoch).map(|b| b.reward).unwrap_or(0)
    }

    /// Vote weight recorded for `position` in `epoch`.
    pub fn vote_weight(&self, epoch: EpochIndex, position: PositionId) -> u64 {
        self.epochs
            .get(&epoch)
            .and_then(|b| b.votes.get(&position))
            .copied()
            .unwrap_or(0)
    }

    /// Total vote weight recorded for `epoch`.
    pub fn total_weight(&self, epoch: EpochIndex) -> u64 {
        self.epochs.get(&epoch).map(|b| b.total_weight).unwrap_or(0)
    }

    /// Events recorded by the bribe, oldest first.
    pub fn events(&self) -> &[Event] {
        self.journal.entries()
    }

    /// Drain the bribe's event journal.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    /// Record a position's vote weight for `epoch`. Replaces any prior
    /// record for the same position.
    pub fn record_vote(&mut self, epoch: EpochIndex, position: PositionId, weight: u64) -> Result<()> {
        let bucket = self.epochs.entry(epoch).or_default();
        if let Some(old) = bucket.votes.insert(position, weight) {
            bucket.total_weight -= old;
        }
        bucket.total_weight = bucket
            .total_weight
            .checked_add(weight)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Remove a position's recorded vote for `epoch` (same-epoch reset).
    pub fn remove_vote(&mut self, epoch: EpochIndex, position: PositionId) {
        if let Some(bucket) = self.epochs.get_mut(&epoch) {
            if let Some(weight) = bucket.votes.remove(&position) {
                bucket.total_weight -= weight;
            }
        }
    }

    /// Credit a deposit to `epoch`'s bucket. The tokens themselves are
    /// moved by the caller (the voter) into [`Self::account`].
    ///
    /// # Errors
    ///
    /// - [`BribeError::ZeroAmount`] for a zero deposit
    pub fn notify(&mut self, epoch: EpochIndex, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(BribeError::ZeroAmount);
        }
        let bucket = self.epochs.entry(epoch).or_default();
        bucket.reward = bucket
            .reward
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        self.journal.record(Event::BribeDeposited {
            pool: self.pool,
            epoch,
            amount,
        });
        tracing::info!(pool = self.pool, epoch, amount, "bribe deposited");
        Ok(())
    }

    /// Claim `position`'s pro-rata share of `epoch`'s bucket, paying `to`.
    ///
    /// Valid only once the epoch has closed; one claim per position per
    /// epoch.
    ///
    /// # Errors
    ///
    /// - [`BribeError::EpochNotEnded`] before `(epoch + 1) * epoch_length`
    /// - [`BribeError::NoVotes`] if the position recorded no weight
    /// - [`BribeError::AlreadyClaimed`] on a second claim
    /// - [`BribeError::NothingToClaim`] if the bucket holds no reward
    pub fn claim(
        &mut self,
        ledger: &mut TokenLedger,
        epoch: EpochIndex,
        position: PositionId,
        to: &AccountId,
        now: u64,
    ) -> Result<u64> {
        let ends_at = epoch.saturating_add(1).saturating_mul(self.epoch_length);
        if now < ends_at {
            return Err(BribeError::EpochNotEnded {
                epoch,
                ends_at,
                now,
            });
        }
        let bucket = self
            .epochs
            .get_mut(&epoch)
            .ok_or(BribeError::NoVotes { position, epoch })?;
        let weight = bucket
            .votes
            .get(&position)
            .copied()
            .ok_or(BribeError::NoVotes { position, epoch })?;
        if weight == 0 {
            return Err(BribeError::NoVotes { position, epoch });
        }
        if bucket.claimed.contains(&position) {
            return Err(BribeError::AlreadyClaimed { position, epoch });
        }
        if bucket.reward == 0 {
            return Err(BribeError::NothingToClaim);
        }

        let amount = mul_div(bucket.reward, weight, bucket.total_weight)?;
        bucket.claimed.insert(position);
        if amount > 0 {
            ledger.transfer(&self.reward_token, &self.account, to, amount)?;
        }
        self.journal.record(Event::BribeClaimed {
            pool: self.pool,
            epoch,
            position,
            amount,
        });
        tracing::info!(pool = self.pool, epoch, position, amount, "bribe claimed");
        Ok(amount)
    }
}
