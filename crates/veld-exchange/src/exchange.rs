//! The facade and the epoch-rollover orchestration.

use serde::{Deserialize, Serialize};
use veld_escrow::VotingEscrow;
use veld_minter::Minter;
use veld_pool::{Pool, PoolFactory};
use veld_token::TokenLedger;
use veld_types::config::ProtocolConfig;
use veld_types::events::Event;
use veld_types::{AccountId, EpochIndex, PoolId, PositionId, TokenId};
use veld_voter::{Voter, VoterError};

use crate::Result;

/// The protocol facade: every public operation of the system.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exchange {
    config: ProtocolConfig,
    governance_token: TokenId,
    ledger: TokenLedger,
    factory: PoolFactory,
    escrow: VotingEscrow,
    voter: Voter,
    minter: Minter,
}

impl Exchange {
    /// Build the protocol from a configuration, with every administrative
    /// role initially held by `admin`. The governance token is registered
    /// in the ledger.
    pub fn new(
        config: ProtocolConfig,
        admin: AccountId,
        governance_token: TokenId,
        now: u64,
    ) -> Result<Self> {
        let mut ledger = TokenLedger::new();
        ledger.register(governance_token)?;
        let factory = PoolFactory::new(&config, admin);
        let escrow = VotingEscrow::new(governance_token, config.max_lock_duration);
        let voter = Voter::new(governance_token, config.epoch_length, admin);
        let minter = Minter::new(&config, admin, now);
        tracing::info!(now, "exchange constructed");
        Ok(Self {
            config,
            governance_token,
            ledger,
            factory,
            escrow,
            voter,
            minter,
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn governance_token(&self) -> TokenId {
        self.governance_token
    }

    /// The token ledger (read access).
    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    /// The token ledger (write access, for embedders funding accounts and
    /// users moving their own tokens).
    pub fn ledger_mut(&mut self) -> &mut TokenLedger {
        &mut self.ledger
    }

    pub fn factory(&self) -> &PoolFactory {
        &self.factory
    }

    pub fn escrow(&self) -> &VotingEscrow {
        &self.escrow
    }

    pub fn voter(&self) -> &Voter {
        &self.voter
    }

    pub fn minter(&self) -> &Minter {
        &self.minter
    }

    /// Register an external token in the ledger.
    pub fn register_token(&mut self, token: TokenId) -> Result<()> {
        Ok(self.ledger.register(token)?)
    }

    /// The epoch index containing `now`.
    pub fn epoch_of(&self, now: u64) -> EpochIndex {
        self.config.epoch_of(now)
    }

    // ------------------------------------------------------------------
    // Pools
    // ------------------------------------------------------------------

    /// Create a pool and its gauge/bribe pair.
    pub fn create_pool(
        &mut self,
        token_a: &TokenId,
        token_b: &TokenId,
        stable: bool,
    ) -> Result<PoolId> {
        let id = self.factory.create_pool(&self.ledger, token_a, token_b, stable)?;
        self.voter.register_pool(id)?;
        Ok(id)
    }

    /// Borrow a pool.
    pub fn pool(&self, id: PoolId) -> Result<&Pool> {
        Ok(self.factory.pool(id)?)
    }

    /// Look up a pool id by pair, in either token order.
    pub fn get_pool(&self, token_a: &TokenId, token_b: &TokenId, stable: bool) -> Option<PoolId> {
        self.factory.get_pool(token_a, token_b, stable)
    }

    /// Mint liquidity shares for tokens already transferred to the pool.
    pub fn mint(&mut self, pool: PoolId, to: &AccountId) -> Result<u64> {
        Ok(self.factory.mint(&self.ledger, pool, to)?)
    }

    /// Burn liquidity shares previously transferred to the pool.
    pub fn burn(&mut self, pool: PoolId, to: &AccountId) -> Result<(u64, u64)> {
        Ok(self.factory.burn(&mut self.ledger, pool, to)?)
    }

    /// Execute a swap against a pool.
    pub fn swap(
        &mut self,
        pool: PoolId,
        amount_a_out: u64,
        amount_b_out: u64,
        to: &AccountId,
    ) -> Result<()> {
        Ok(self
            .factory
            .swap(&mut self.ledger, pool, amount_a_out, amount_b_out, to)?)
    }

    /// Quote a swap.
    pub fn get_amount_out(&self, pool: PoolId, amount_in: u64, token_in: &TokenId) -> Result<u64> {
        Ok(self.factory.pool(pool)?.get_amount_out(amount_in, token_in)?)
    }

    /// Force a pool's reserves to its actual balances.
    pub fn sync(&mut self, pool: PoolId) -> Result<()> {
        Ok(self.factory.sync(&self.ledger, pool)?)
    }

    /// Move liquidity shares between holders.
    pub fn transfer_liquidity(
        &mut self,
        pool: PoolId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<()> {
        Ok(self.factory.pool_mut(pool)?.transfer_shares(from, to, amount)?)
    }

    /// Claimable fee amounts for a holder.
    pub fn claimable_fees(&self, pool: PoolId, holder: &AccountId) -> Result<(u64, u64)> {
        Ok(self.factory.pool(pool)?.claimable_fees(holder)?)
    }

    /// Pay out a holder's accrued pool fees.
    pub fn claim_fees(
        &mut self,
        pool: PoolId,
        holder: &AccountId,
        to: &AccountId,
    ) -> Result<(u64, u64)> {
        Ok(self
            .factory
            .pool_mut(pool)?
            .claim_fees(&mut self.ledger, holder, to)?)
    }

    // ------------------------------------------------------------------
    // Escrow
    // ------------------------------------------------------------------

    /// Lock governance tokens into a new voting position.
    pub fn create_lock(
        &mut self,
        owner: &AccountId,
        amount: u64,
        unlock_time: u64,
        now: u64,
    ) -> Result<PositionId> {
        Ok(self
            .escrow
            .create_lock(&mut self.ledger, owner, amount, unlock_time, now)?)
    }

    /// A position's live voting power.
    pub fn voting_power(&self, position: PositionId, now: u64) -> Result<u64> {
        Ok(self.escrow.voting_power(position, now)?)
    }

    /// Add tokens to an unexpired position.
    pub fn increase_lock(
        &mut self,
        position: PositionId,
        owner: &AccountId,
        amount: u64,
        now: u64,
    ) -> Result<()> {
        Ok(self
            .escrow
            .increase_amount(&mut self.ledger, position, owner, amount, now)?)
    }

    /// Merge one position into another.
    pub fn merge_locks(
        &mut self,
        from: PositionId,
        to: PositionId,
        caller: &AccountId,
    ) -> Result<()> {
        Ok(self.escrow.merge(from, to, caller)?)
    }

    /// Withdraw an expired position.
    pub fn withdraw_lock(
        &mut self,
        position: PositionId,
        caller: &AccountId,
        now: u64,
    ) -> Result<u64> {
        Ok(self.escrow.withdraw(&mut self.ledger, position, caller, now)?)
    }

    // ------------------------------------------------------------------
    // Voting, gauges, bribes
    // ------------------------------------------------------------------

    /// Cast a position's vote across pools.
    pub fn vote(
        &mut self,
        position: PositionId,
        caller: &AccountId,
        pools: &[PoolId],
        weights: &[u64],
        now: u64,
    ) -> Result<()> {
        Ok(self
            .voter
            .vote(&self.escrow, position, caller, pools, weights, now)?)
    }

    /// Clear a position's allocation.
    pub fn reset_vote(&mut self, position: PositionId, caller: &AccountId, now: u64) -> Result<()> {
        Ok(self.voter.reset(&self.escrow, position, caller, now)?)
    }

    /// Stake liquidity shares into a pool's gauge.
    pub fn gauge_deposit(
        &mut self,
        pool: PoolId,
        staker: &AccountId,
        amount: u64,
        now: u64,
    ) -> Result<()> {
        let pool_ref = self.factory.pool_mut(pool)?;
        let gauge = self.voter.gauge_mut(pool)?;
        Ok(gauge.deposit(pool_ref, staker, amount, now)?)
    }

    /// Unstake liquidity shares from a pool's gauge.
    pub fn gauge_withdraw(
        &mut self,
        pool: PoolId,
        staker: &AccountId,
        amount: u64,
        now: u64,
    ) -> Result<()> {
        let pool_ref = self.factory.pool_mut(pool)?;
        let gauge = self.voter.gauge_mut(pool)?;
        Ok(gauge.withdraw(pool_ref, staker, amount, now)?)
    }

    /// Pay out a staker's accrued gauge rewards.
    pub fn gauge_reward(&mut self, pool: PoolId, staker: &AccountId, now: u64) -> Result<u64> {
        let gauge = self.voter.gauge_mut(pool)?;
        Ok(gauge.get_reward(&mut self.ledger, staker, now)?)
    }

    /// Rewards accrued but not yet paid to a gauge staker.
    pub fn gauge_earned(&self, pool: PoolId, staker: &AccountId, now: u64) -> Result<u64> {
        Ok(self.voter.gauge(pool)?.earned(staker, now)?)
    }

    /// Distribute emission already held by the voter account. Keeper-only.
    pub fn distribute_all(&mut self, total_amount: u64, caller: &AccountId, now: u64) -> Result<()> {
        Ok(self
            .voter
            .distribute_all(&mut self.ledger, total_amount, caller, now)?)
    }

    /// Fund a pool's bribe bucket for the current or a future epoch.
    pub fn notify_bribe_reward(
        &mut self,
        pool: PoolId,
        epoch: EpochIndex,
        amount: u64,
        from: &AccountId,
        now: u64,
    ) -> Result<()> {
        Ok(self
            .voter
            .notify_bribe_reward(&mut self.ledger, pool, epoch, amount, from, now)?)
    }

    /// Claim a position's bribe share for a closed epoch.
    pub fn claim_bribe(
        &mut self,
        pool: PoolId,
        epoch: EpochIndex,
        position: PositionId,
        caller: &AccountId,
        now: u64,
    ) -> Result<u64> {
        Ok(self.voter.claim_bribe(
            &mut self.ledger,
            &self.escrow,
            pool,
            epoch,
            position,
            caller,
            now,
        )?)
    }

    // ------------------------------------------------------------------
    // Epoch rollover
    // ------------------------------------------------------------------

    /// Advance one epoch: the minter computes the emission, the governance
    /// tokens are minted to the voter, and the voter fans them out to the
    /// gauges by weight share. Keeper-only.
    ///
    /// Returns the emitted amount, or `None` if the current epoch is
    /// already processed (idempotent no-op).
    pub fn run_epoch(&mut self, caller: &AccountId, now: u64) -> Result<Option<u64>> {
        // Distribution needs votes; check before the minter mutates.
        if self.voter.total_weight() == 0 {
            return Err(VoterError::NoVotes.into());
        }
        let Some(emission) = self.minter.update_period(caller, now)? else {
            return Ok(None);
        };
        self.ledger
            .mint(&self.governance_token, &self.voter.account(), emission)?;
        self.voter
            .distribute_all(&mut self.ledger, emission, caller, now)?;
        tracing::info!(emission, now, "epoch processed");
        Ok(Some(emission))
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Set or clear the factory pause flag. Pauser-gated.
    pub fn set_pause(&mut self, caller: &AccountId, paused: bool) -> Result<()> {
        Ok(self.factory.set_pause(caller, paused)?)
    }

    /// Update a fee schedule. Fee-manager-gated.
    pub fn set_fee(&mut self, caller: &AccountId, stable: bool, fee: u64) -> Result<()> {
        Ok(self.factory.set_fee(caller, stable, fee)?)
    }

    /// Reassign the keeper on both the voter and the minter. Admin-gated.
    pub fn set_keeper(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.voter.set_keeper(caller, new)?;
        self.minter.set_keeper(caller, new)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Drain every component's event journal, grouped by component:
    /// factory, pools, escrow, voter, gauges, bribes, minter.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = self.factory.drain_events();
        let pool_ids: Vec<PoolId> = self.factory.all_pools().to_vec();
        for id in &pool_ids {
            if let Ok(pool) = self.factory.pool_mut(*id) {
                events.extend(pool.drain_events());
            }
        }
        events.extend(self.escrow.drain_events());
        events.extend(self.voter.drain_events());
        for id in &pool_ids {
            if let Ok(gauge) = self.voter.gauge_mut(*id) {
                events.extend(gauge.drain_events());
            }
            if let Ok(bribe) = self.voter.bribe_mut(*id) {
                events.extend(bribe.drain_events());
            }
        }
        events.extend(self.minter.drain_events());
        events
    }
}
