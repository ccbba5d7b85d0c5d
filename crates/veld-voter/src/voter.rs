//! Vote records, emission distribution, and bribe routing.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use veld_bribe::Bribe;
use veld_escrow::VotingEscrow;
use veld_gauge::Gauge;
use veld_math::{mul_div, MathError};
use veld_token::TokenLedger;
use veld_types::events::{Event, EventJournal};
use veld_types::roles::KeeperRole;
use veld_types::{
    account_domain, derived_account, AccountId, EpochIndex, PoolId, PositionId, TokenId,
};

use crate::{Result, VoterError};

/// One position's recorded allocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Allocation {
    epoch: EpochIndex,
    entries: Vec<(PoolId, u64)>,
}

/// The voter: epoch-based vote allocation and emission fan-out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Voter {
    role: KeeperRole,
    account: AccountId,
    reward_token: TokenId,
    epoch_length: u64,
    gauges: HashMap<PoolId, Gauge>,
    bribes: HashMap<PoolId, Bribe>,
    pool_weights: HashMap<PoolId, u64>,
    total_weight: u64,
    allocations: HashMap<PositionId, Allocation>,
    distributed: HashSet<EpochIndex>,
    journal: EventJournal,
}

impl Voter {
    /// Create the voter distributing `reward_token` over epochs of
    /// `epoch_length` seconds.
    pub fn new(reward_token: TokenId, epoch_length: u64, admin: AccountId) -> Self {
        Self {
            role: KeeperRole::new(admin),
            account: derived_account(account_domain::VOTER, 0),
            reward_token,
            epoch_length,
            gauges: HashMap::new(),
            bribes: HashMap::new(),
            pool_weights: HashMap::new(),
            total_weight: 0,
            allocations: HashMap::new(),
            distributed: HashSet::new(),
            journal: EventJournal::new(),
        }
    }

    /// The voter's token account: emission funds awaiting distribution.
    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn keeper(&self) -> AccountId {
        self.role.keeper()
    }

    /// The epoch index containing `now`.
    pub fn epoch_of(&self, now: u64) -> EpochIndex {
        now / self.epoch_length
    }

    /// Aggregate weight currently allocated to `pool`.
    pub fn pool_weight(&self, pool: PoolId) -> u64 {
        self.pool_weights.get(&pool).copied().unwrap_or(0)
    }

    /// Aggregate weight across all pools.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Whether `epoch`'s emission has been distributed.
    pub fn is_distributed(&self, epoch: EpochIndex) -> bool {
        self.distributed.contains(&epoch)
    }

    /// Borrow a pool's gauge.
    pub fn gauge(&self, pool: PoolId) -> Result<&Gauge> {
        self.gauges.get(&pool).ok_or(VoterError::UnknownPool { pool })
    }

    /// Borrow a pool's gauge mutably.
    pub fn gauge_mut(&mut self, pool: PoolId) -> Result<&mut Gauge> {
        self.gauges
            .get_mut(&pool)
            .ok_or(VoterError::UnknownPool { pool })
    }

    /// Borrow a pool's bribe store.
    pub fn bribe(&self, pool: PoolId) -> Result<&Bribe> {
        self.bribes.get(&pool).ok_or(VoterError::UnknownPool { pool })
    }

    /// Borrow a pool's bribe store mutably.
    pub fn bribe_mut(&mut self, pool: PoolId) -> Result<&mut Bribe> {
        self.bribes
            .get_mut(&pool)
            .ok_or(VoterError::UnknownPool { pool })
    }

    /// Reassign the keeper. Admin-gated.
    pub fn set_keeper(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.role.set_keeper(caller, new)?;
        self.journal.record(Event::KeeperChanged { keeper: new });
        Ok(())
    }

    /// Events recorded by the voter, oldest first.
    pub fn events(&self) -> &[Event] {
        self.journal.entries()
    }

    /// Drain the voter's event journal.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    /// Create the gauge and bribe pair for a newly created pool.
    ///
    /// # Errors
    ///
    /// - [`VoterError::AlreadyRegistered`] if the pool already has them
    pub fn register_pool(&mut self, pool: PoolId) -> Result<()> {
        if self.gauges.contains_key(&pool) {
            return Err(VoterError::AlreadyRegistered { pool });
        }
        self.gauges
            .insert(pool, Gauge::new(pool, self.reward_token, self.epoch_length));
        self.bribes
            .insert(pool, Bribe::new(pool, self.reward_token, self.epoch_length));
        tracing::info!(pool, "gauge and bribe registered");
        Ok(())
    }

    /// Cast a position's vote: allocate `weights` across `pools`.
    ///
    /// Any prior allocation is reset first, so re-voting within an epoch
    /// is an atomic reset-then-revote and never double counts. The total
    /// requested weight is capped by the position's live voting power.
    ///
    /// # Errors
    ///
    /// - [`VoterError::NotPositionOwner`] unless `caller` owns the position
    /// - [`VoterError::EmptyVote`] / [`VoterError::LengthMismatch`] /
    ///   [`VoterError::DuplicatePool`] / [`VoterError::ZeroWeight`] for a
    ///   malformed allocation
    /// - [`VoterError::UnknownPool`] for an unregistered pool
    /// - [`VoterError::ExceedsPower`] if the allocation exceeds the
    ///   position's voting power at vote time
    pub fn vote(
        &mut self,
        escrow: &VotingEscrow,
        position: PositionId,
        caller: &AccountId,
        pools: &[PoolId],
        weights: &[u64],
        now: u64,
    ) -> Result<()> {
        if escrow.owner_of(position)? != *caller {
            return Err(VoterError::NotPositionOwner { position });
        }
        if pools.is_empty() {
            return Err(VoterError::EmptyVote);
        }
        if pools.len() != weights.len() {
            return Err(VoterError::LengthMismatch {
                pools: pools.len(),
                weights: weights.len(),
            });
        }
        let mut seen = HashSet::new();
        for pool in pools {
            if !self.gauges.contains_key(pool) {
                return Err(VoterError::UnknownPool { pool: *pool });
            }
            if !seen.insert(*pool) {
                return Err(VoterError::DuplicatePool { pool: *pool });
            }
        }
        let mut requested: u64 = 0;
        for weight in weights {
            if *weight == 0 {
                return Err(VoterError::ZeroWeight);
            }
            requested = requested.checked_add(*weight).ok_or(MathError::Overflow)?;
        }
        let power = escrow.voting_power(position, now)?;
        if requested > power {
            return Err(VoterError::ExceedsPower { requested, power });
        }

        let epoch = self.epoch_of(now);
        self.clear_allocation(position, epoch);
        // Reject an allocation that would overflow the global total before
        // recording any of it.
        self.total_weight
            .checked_add(requested)
            .ok_or(MathError::Overflow)?;

        let mut entries = Vec::with_capacity(pools.len());
        for (pool, weight) in pools.iter().zip(weights.iter()) {
            let aggregate = self.pool_weights.entry(*pool).or_insert(0);
            *aggregate = aggregate.checked_add(*weight).ok_or(MathError::Overflow)?;
            self.total_weight = self
                .total_weight
                .checked_add(*weight)
                .ok_or(MathError::Overflow)?;
            if let Some(bribe) = self.bribes.get_mut(pool) {
                bribe.record_vote(epoch, position, *weight)?;
            }
            entries.push((*pool, *weight));
            self.journal.record(Event::VoteCast {
                position,
                epoch,
                pool: *pool,
                weight: *weight,
            });
        }
        self.allocations.insert(position, Allocation { epoch, entries });
        tracing::info!(position, epoch, requested, power, "vote cast");
        Ok(())
    }

    /// Clear a position's allocation without casting a new one.
    pub fn reset(
        &mut self,
        escrow: &VotingEscrow,
        position: PositionId,
        caller: &AccountId,
        now: u64,
    ) -> Result<()> {
        if escrow.owner_of(position)? != *caller {
            return Err(VoterError::NotPositionOwner { position });
        }
        let epoch = self.epoch_of(now);
        self.clear_allocation(position, epoch);
        Ok(())
    }

    /// Distribute `total_amount` of emission across pools proportional to
    /// their weight share, topping up each pool's gauge. Keeper-only; at
    /// most once per epoch.
    ///
    /// The voter's account must already hold `total_amount` of the reward
    /// token.
    ///
    /// # Errors
    ///
    /// - [`VoterError::AlreadyDistributed`] on a repeat call this epoch
    /// - [`VoterError::NoVotes`] if no weight is allocated anywhere
    /// - [`VoterError::ZeroAmount`] for a zero amount
    pub fn distribute_all(
        &mut self,
        ledger: &mut TokenLedger,
        total_amount: u64,
        caller: &AccountId,
        now: u64,
    ) -> Result<()> {
        self.role.require_keeper(caller)?;
        let epoch = self.epoch_of(now);
        if self.distributed.contains(&epoch) {
            return Err(VoterError::AlreadyDistributed { epoch });
        }
        if total_amount == 0 {
            return Err(VoterError::ZeroAmount);
        }
        if self.total_weight == 0 {
            return Err(VoterError::NoVotes);
        }

        // Deterministic fan-out order regardless of insertion history.
        let mut weighted: Vec<(PoolId, u64)> = self
            .pool_weights
            .iter()
            .filter(|(_, w)| **w > 0)
            .map(|(p, w)| (*p, *w))
            .collect();
        weighted.sort_unstable_by_key(|(pool, _)| *pool);

        for (pool, weight) in weighted {
            let share = mul_div(total_amount, weight, self.total_weight)?;
            if share == 0 {
                continue;
            }
            let gauge = self
                .gauges
                .get_mut(&pool)
                .ok_or(VoterError::UnknownPool { pool })?;
            ledger.transfer(&self.reward_token, &self.account, &gauge.account(), share)?;
            gauge.notify_reward(share, now)?;
            self.journal.record(Event::EmissionDistributed {
                epoch,
                pool,
                amount: share,
            });
            tracing::info!(epoch, pool, amount = share, "emission distributed");
        }
        self.distributed.insert(epoch);
        Ok(())
    }

    /// Fund a pool's bribe bucket for the current or a future epoch,
    /// pulling the reward tokens from `from`.
    ///
    /// # Errors
    ///
    /// - [`VoterError::UnknownPool`] for an unregistered pool
    /// - [`VoterError::BackdatedEpoch`] for a past epoch
    /// - [`VoterError::ZeroAmount`] for a zero amount
    pub fn notify_bribe_reward(
        &mut self,
        ledger: &mut TokenLedger,
        pool: PoolId,
        epoch: EpochIndex,
        amount: u64,
        from: &AccountId,
        now: u64,
    ) -> Result<()> {
        let current = self.epoch_of(now);
        if epoch < current {
            return Err(VoterError::BackdatedEpoch { epoch, current });
        }
        if amount == 0 {
            return Err(VoterError::ZeroAmount);
        }
        let bribe = self
            .bribes
            .get_mut(&pool)
            .ok_or(VoterError::UnknownPool { pool })?;
        ledger.transfer(&self.reward_token, from, &bribe.account(), amount)?;
        bribe.notify(epoch, amount)?;
        Ok(())
    }

    /// Claim a position's bribe share for `(pool, epoch)`, paying the
    /// position's owner.
    pub fn claim_bribe(
        &mut self,
        ledger: &mut TokenLedger,
        escrow: &VotingEscrow,
        pool: PoolId,
        epoch: EpochIndex,
        position: PositionId,
        caller: &AccountId,
        now: u64,
    ) -> Result<u64> {
        if escrow.owner_of(position)? != *caller {
            return Err(VoterError::NotPositionOwner { position });
        }
        let bribe = self
            .bribes
            .get_mut(&pool)
            .ok_or(VoterError::UnknownPool { pool })?;
        Ok(bribe.claim(ledger, epoch, position, caller, now)?)
    }

    /// Remove a position's previous allocation from the running
    /// aggregates. Same-epoch bribe records are withdrawn too; records of
    /// closed epochs stay claimable.
    fn clear_allocation(&mut self, position: PositionId, current_epoch: EpochIndex) {
        let Some(allocation) = self.allocations.remove(&position) else {
            return;
        };
        for (pool, weight) in &allocation.entries {
            if let Some(aggregate) = self.pool_weights.get_mut(pool) {
                *aggregate = aggregate.saturating_sub(*weight);
            }
            self.total_weight = self.total_weight.saturating_sub(*weight);
            if allocation.epoch == current_epoch {
                if let Some(bribe) = self.bribes.get_mut(pool) {
                    bribe.remove_vote(allocation.epoch, position);
                }
            }
        }
        self.journal.record(Event::VoteReset {
            position,
            epoch: allocation.epoch,
        });
    }
}
