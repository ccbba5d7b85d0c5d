//! The gauge state machine.
//!
//! Reward streams are notified as a lump amount spread over one epoch
//! length. The reward rate is stored scaled by `INDEX_SCALE`, which bounds
//! truncation to at most one base unit per payout instead of one unit per
//! second of the period.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use veld_math::MathError;
use veld_pool::Pool;
use veld_token::TokenLedger;
use veld_types::events::{Event, EventJournal};
use veld_types::{
    account_domain, derived_account, AccountId, PoolId, TokenId, INDEX_SCALE,
};

use crate::{GaugeError, Result};

/// A per-pool staking gauge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gauge {
    pool: PoolId,
    account: AccountId,
    reward_token: TokenId,
    epoch_length: u64,
    total_staked: u64,
    balances: HashMap<AccountId, u64>,
    reward_rate: u128,
    period_finish: u64,
    last_update: u64,
    reward_per_token_stored: u128,
    paid_per_token: HashMap<AccountId, u128>,
    unpaid: HashMap<AccountId, u64>,
    journal: EventJournal,
}

impl Gauge {
    /// Create the gauge for `pool`, streaming `reward_token` over periods
    /// of `epoch_length` seconds.
    pub fn new(pool: PoolId, reward_token: TokenId, epoch_length: u64) -> Self {
        Self {
            pool,
            account: derived_account(account_domain::GAUGE, pool),
            reward_token,
            epoch_length,
            total_staked: 0,
            balances: HashMap::new(),
            reward_rate: 0,
            period_finish: 0,
            last_update: 0,
            reward_per_token_stored: 0,
            paid_per_token: HashMap::new(),
            unpaid: HashMap::new(),
            journal: EventJournal::new(),
        }
    }

    pub fn pool(&self) -> PoolId {
        self.pool
    }

    /// The gauge's token account: holds staked shares and reward tokens.
    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn total_staked(&self) -> u64 {
        self.total_staked
    }

    /// Staked share balance of `staker`.
    pub fn balance_of(&self, staker: &AccountId) -> u64 {
        self.balances.get(staker).copied().unwrap_or(0)
    }

    /// Current reward rate, scaled by `INDEX_SCALE`, per second.
    pub fn reward_rate(&self) -> u128 {
        self.reward_rate
    }

    pub fn period_finish(&self) -> u64 {
        self.period_finish
    }

    /// Events recorded by the gauge, oldest first.
    pub fn events(&self) -> &[Event] {
        self.journal.entries()
    }

    /// Drain the gauge's event journal.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    /// Stake `amount` liquidity shares.
    ///
    /// The shares move from the staker to the gauge's account inside the
    /// pool, which checkpoints both parties' fee accrual.
    ///
    /// # Errors
    ///
    /// - [`GaugeError::ZeroAmount`] for a zero amount
    /// - [`GaugeError::Pool`] if the staker's share balance is too low
    pub fn deposit(
        &mut self,
        pool: &mut Pool,
        staker: &AccountId,
        amount: u64,
        now: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Err(GaugeError::ZeroAmount);
        }
        let held = pool.share_balance_of(staker);
        if held < amount {
            return Err(GaugeError::Pool(veld_pool::PoolError::InsufficientShares {
                have: held,
                need: amount,
            }));
        }
        self.update_reward(staker, now)?;
        pool.transfer_shares(staker, &self.account, amount)?;
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        let balance = self.balances.entry(*staker).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(MathError::Overflow)?;
        self.journal.record(Event::GaugeDeposit {
            pool: self.pool,
            staker: *staker,
            amount,
        });
        tracing::info!(pool = self.pool, amount, "gauge deposit");
        Ok(())
    }

    /// Unstake `amount` liquidity shares. Never pause-gated.
    ///
    /// # Errors
    ///
    /// - [`GaugeError::ZeroAmount`] for a zero amount
    /// - [`GaugeError::InsufficientStake`] if the staked balance is too low
    pub fn withdraw(
        &mut self,
        pool: &mut Pool,
        staker: &AccountId,
        amount: u64,
        now: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Err(GaugeError::ZeroAmount);
        }
        let staked = self.balance_of(staker);
        if staked < amount {
            return Err(GaugeError::InsufficientStake {
                have: staked,
                need: amount,
            });
        }
        self.update_reward(staker, now)?;
        pool.transfer_shares(&self.account, staker, amount)?;
        self.balances.insert(*staker, staked - amount);
        self.total_staked -= amount;
        self.journal.record(Event::GaugeWithdraw {
            pool: self.pool,
            staker: *staker,
            amount,
        });
        tracing::info!(pool = self.pool, amount, "gauge withdraw");
        Ok(())
    }

    /// Pay out the staker's accrued rewards and reset the unpaid accrual.
    ///
    /// Returns the amount paid; paying zero is not an error.
    pub fn get_reward(
        &mut self,
        ledger: &mut TokenLedger,
        staker: &AccountId,
        now: u64,
    ) -> Result<u64> {
        self.update_reward(staker, now)?;
        let amount = self.unpaid.get(staker).copied().unwrap_or(0);
        if amount == 0 {
            return Ok(0);
        }
        self.unpaid.insert(*staker, 0);
        ledger.transfer(&self.reward_token, &self.account, staker, amount)?;
        self.journal.record(Event::GaugeRewardPaid {
            pool: self.pool,
            staker: *staker,
            amount,
        });
        tracing::info!(pool = self.pool, amount, "gauge reward paid");
        Ok(amount)
    }

    /// Rewards accrued but not yet paid to `staker`, as of `now`.
    pub fn earned(&self, staker: &AccountId, now: u64) -> Result<u64> {
        let rpt = self.reward_per_token(now);
        let paid = self.paid_per_token.get(staker).copied().unwrap_or(0);
        let balance = self.balance_of(staker) as u128;
        let delta = rpt.checked_sub(paid).ok_or(MathError::Overflow)?;
        let fresh = balance.checked_mul(delta).ok_or(MathError::Overflow)? / INDEX_SCALE;
        let fresh = u64::try_from(fresh).map_err(|_| MathError::Overflow)?;
        Ok(self
            .unpaid
            .get(staker)
            .copied()
            .unwrap_or(0)
            .checked_add(fresh)
            .ok_or(MathError::Overflow)?)
    }

    /// Top up the reward stream with `amount`, spread over one epoch
    /// length from `now`. An unfinished previous period's remainder rolls
    /// into the new rate.
    pub fn notify_reward(&mut self, amount: u64, now: u64) -> Result<()> {
        if self.epoch_length == 0 {
            return Err(GaugeError::Math(MathError::DivisionByZero));
        }
        // Settle the accumulator up to now under the old rate.
        self.reward_per_token_stored = self.reward_per_token(now);

        let scaled = (amount as u128)
            .checked_mul(INDEX_SCALE)
            .ok_or(MathError::Overflow)?;
        self.reward_rate = if now >= self.period_finish {
            scaled / self.epoch_length as u128
        } else {
            let remaining = (self.period_finish - now) as u128;
            let leftover = remaining
                .checked_mul(self.reward_rate)
                .ok_or(MathError::Overflow)?;
            scaled
                .checked_add(leftover)
                .ok_or(MathError::Overflow)?
                / self.epoch_length as u128
        };
        self.last_update = now;
        self.period_finish = now + self.epoch_length;
        tracing::debug!(
            pool = self.pool,
            amount,
            rate = self.reward_rate,
            period_finish = self.period_finish,
            "gauge reward notified"
        );
        Ok(())
    }

    /// The accumulator value at `now`: reward per staked share, scaled by
    /// `INDEX_SCALE`.
    fn reward_per_token(&self, now: u64) -> u128 {
        if self.total_staked == 0 {
            return self.reward_per_token_stored;
        }
        let applicable = now.min(self.period_finish);
        let elapsed = applicable.saturating_sub(self.last_update) as u128;
        self.reward_per_token_stored + elapsed * self.reward_rate / self.total_staked as u128
    }

    fn update_reward(&mut self, staker: &AccountId, now: u64) -> Result<()> {
        let earned = self.earned(staker, now)?;
        self.reward_per_token_stored = self.reward_per_token(now);
        self.last_update = now.min(self.period_finish).max(self.last_update);
        self.unpaid.insert(*staker, earned);
        self.paid_per_token
            .insert(*staker, self.reward_per_token_stored);
        Ok(())
    }
}
