//! Pool registry and administrative surface.
//!
//! The factory maps `(token pair, stable flag)` to exactly one pool,
//! order-insensitively, and carries the role capability: pool admin,
//! pauser, and fee manager. The pause flag gates pool creation, mint and
//! swap; burn, sync and fee claims always remain possible.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use veld_token::TokenLedger;
use veld_types::config::ProtocolConfig;
use veld_types::events::{Event, EventJournal};
use veld_types::roles::AdminRoles;
use veld_types::{AccountId, PoolId, TokenId, ZERO_ACCOUNT};

use crate::pool::Pool;
use crate::{PoolError, Result};

/// Registry key: sorted token pair plus stability flag.
type PoolKey = (TokenId, TokenId, bool);

/// The pool factory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolFactory {
    roles: AdminRoles,
    paused: bool,
    stable_fee: u64,
    volatile_fee: u64,
    min_fee: u64,
    max_fee: u64,
    minimum_liquidity: u64,
    pools: HashMap<PoolId, Pool>,
    registry: HashMap<PoolKey, PoolId>,
    ordered: Vec<PoolId>,
    next_id: PoolId,
    journal: EventJournal,
}

fn pool_key(token_a: &TokenId, token_b: &TokenId, stable: bool) -> PoolKey {
    if token_a <= token_b {
        (*token_a, *token_b, stable)
    } else {
        (*token_b, *token_a, stable)
    }
}

impl PoolFactory {
    /// Create a factory with every role held by `admin`.
    pub fn new(config: &ProtocolConfig, admin: AccountId) -> Self {
        Self {
            roles: AdminRoles::new(admin),
            paused: false,
            stable_fee: config.stable_fee,
            volatile_fee: config.volatile_fee,
            min_fee: config.min_fee,
            max_fee: config.max_fee,
            minimum_liquidity: config.minimum_liquidity,
            pools: HashMap::new(),
            registry: HashMap::new(),
            ordered: Vec::new(),
            next_id: 1,
            journal: EventJournal::new(),
        }
    }

    pub fn pool_admin(&self) -> AccountId {
        self.roles.pool_admin()
    }

    pub fn pauser(&self) -> AccountId {
        self.roles.pauser()
    }

    pub fn fee_manager(&self) -> AccountId {
        self.roles.fee_manager()
    }

    pub fn stable_fee(&self) -> u64 {
        self.stable_fee
    }

    pub fn volatile_fee(&self) -> u64 {
        self.volatile_fee
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Events recorded by the factory, oldest first.
    pub fn events(&self) -> &[Event] {
        self.journal.entries()
    }

    /// Drain the factory's event journal.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    /// Create a pool for a token pair.
    ///
    /// Permissionless, but blocked while the factory is paused. The pair
    /// is registered order-insensitively; at most one pool exists per
    /// `(pair, stable)` key.
    ///
    /// # Errors
    ///
    /// - [`PoolError::FactoryPaused`] while paused
    /// - [`PoolError::SameToken`] for an identical pair
    /// - [`PoolError::ZeroAddress`] for a zero token id
    /// - [`PoolError::InvalidToken`] for an unregistered token
    /// - [`PoolError::PoolExists`] if the key is taken
    pub fn create_pool(
        &mut self,
        ledger: &TokenLedger,
        token_a: &TokenId,
        token_b: &TokenId,
        stable: bool,
    ) -> Result<PoolId> {
        if self.paused {
            return Err(PoolError::FactoryPaused);
        }
        if token_a == token_b {
            return Err(PoolError::SameToken);
        }
        if *token_a == ZERO_ACCOUNT || *token_b == ZERO_ACCOUNT {
            return Err(PoolError::ZeroAddress);
        }
        if !ledger.is_registered(token_a) || !ledger.is_registered(token_b) {
            return Err(PoolError::InvalidToken);
        }
        let key = pool_key(token_a, token_b, stable);
        if self.registry.contains_key(&key) {
            return Err(PoolError::PoolExists);
        }

        let id = self.next_id;
        self.next_id += 1;
        let fee = if stable { self.stable_fee } else { self.volatile_fee };
        let (sorted_a, sorted_b, _) = key;
        let pool = Pool::new(id, sorted_a, sorted_b, stable, fee, self.minimum_liquidity);
        self.pools.insert(id, pool);
        self.registry.insert(key, id);
        self.ordered.push(id);
        self.journal.record(Event::PoolCreated {
            pool: id,
            token_a: sorted_a,
            token_b: sorted_b,
            stable,
        });
        tracing::info!(pool = id, stable, fee, "pool created");
        Ok(id)
    }

    /// Look up a pool id by pair, in either token order.
    pub fn get_pool(&self, token_a: &TokenId, token_b: &TokenId, stable: bool) -> Option<PoolId> {
        self.registry.get(&pool_key(token_a, token_b, stable)).copied()
    }

    /// Whether `id` names a registered pool.
    pub fn is_pool(&self, id: PoolId) -> bool {
        self.pools.contains_key(&id)
    }

    /// All pool ids in creation order.
    pub fn all_pools(&self) -> &[PoolId] {
        &self.ordered
    }

    /// Borrow a pool.
    pub fn pool(&self, id: PoolId) -> Result<&Pool> {
        self.pools.get(&id).ok_or(PoolError::UnknownPool { pool: id })
    }

    /// Borrow a pool mutably.
    pub fn pool_mut(&mut self, id: PoolId) -> Result<&mut Pool> {
        self.pools
            .get_mut(&id)
            .ok_or(PoolError::UnknownPool { pool: id })
    }

    /// A pool's reserves, for display.
    ///
    /// # Errors
    ///
    /// - [`PoolError::UnknownPool`] if `id` is not a pool
    pub fn pool_tvl(&self, id: PoolId) -> Result<(u64, u64)> {
        Ok(self.pool(id)?.reserves())
    }

    /// Mint liquidity shares; pause-gated.
    pub fn mint(&mut self, ledger: &TokenLedger, id: PoolId, to: &AccountId) -> Result<u64> {
        if self.paused {
            return Err(PoolError::Paused);
        }
        self.pool_mut(id)?.mint(ledger, to)
    }

    /// Execute a swap; pause-gated.
    pub fn swap(
        &mut self,
        ledger: &mut TokenLedger,
        id: PoolId,
        amount_a_out: u64,
        amount_b_out: u64,
        to: &AccountId,
    ) -> Result<()> {
        if self.paused {
            return Err(PoolError::Paused);
        }
        self.pool_mut(id)?.swap(ledger, amount_a_out, amount_b_out, to)
    }

    /// Burn liquidity shares. Withdrawal is never pause-gated.
    pub fn burn(
        &mut self,
        ledger: &mut TokenLedger,
        id: PoolId,
        to: &AccountId,
    ) -> Result<(u64, u64)> {
        self.pool_mut(id)?.burn(ledger, to)
    }

    /// Force a pool's reserves to its actual balances.
    pub fn sync(&mut self, ledger: &TokenLedger, id: PoolId) -> Result<()> {
        self.pool_mut(id)?.sync(ledger);
        Ok(())
    }

    /// Reassign the pool-admin role. Admin-gated.
    pub fn set_pool_admin(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.roles.set_pool_admin(caller, new)?;
        self.journal.record(Event::PoolAdminChanged { admin: new });
        Ok(())
    }

    /// Reassign the pauser role. Pauser-gated.
    pub fn set_pauser(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.roles.set_pauser(caller, new)?;
        self.journal.record(Event::PauserChanged { pauser: new });
        Ok(())
    }

    /// Reassign the fee-manager role. Fee-manager-gated.
    pub fn set_fee_manager(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.roles.set_fee_manager(caller, new)?;
        self.journal.record(Event::FeeManagerChanged { fee_manager: new });
        Ok(())
    }

    /// Set or clear the pause flag. Pauser-gated.
    pub fn set_pause(&mut self, caller: &AccountId, paused: bool) -> Result<()> {
        self.roles.require_pauser(caller)?;
        self.paused = paused;
        self.journal.record(Event::PauseSet { paused });
        tracing::warn!(paused, "factory pause flag set");
        Ok(())
    }

    /// Update the swap fee for stable or volatile pools. Fee-manager-gated;
    /// existing pools of that kind pick up the new rate.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidFee`] outside the configured bounds
    pub fn set_fee(&mut self, caller: &AccountId, stable: bool, fee: u64) -> Result<()> {
        self.roles.require_fee_manager(caller)?;
        if fee < self.min_fee || fee > self.max_fee {
            return Err(PoolError::InvalidFee { fee });
        }
        if stable {
            self.stable_fee = fee;
        } else {
            self.volatile_fee = fee;
        }
        for pool in self.pools.values_mut() {
            if pool.stable() == stable {
                pool.set_fee(fee);
            }
        }
        self.journal.record(Event::FeeUpdated { stable, fee });
        tracing::info!(stable, fee, "swap fee updated");
        Ok(())
    }
}
