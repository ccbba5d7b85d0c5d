//! The lock-position store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use veld_math::{mul_div, MathError};
use veld_token::TokenLedger;
use veld_types::events::{Event, EventJournal};
use veld_types::{
    account_domain, derived_account, AccountId, PositionId, TokenId, ZERO_ACCOUNT,
};

use crate::{EscrowError, Result};

/// A lock position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lock {
    /// Current owner.
    pub owner: AccountId,
    /// Locked governance-token amount in base units.
    pub amount: u64,
    /// Unix timestamp at which the lock expires.
    pub unlock_time: u64,
}

/// The voting escrow: governance tokens locked into decaying positions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingEscrow {
    token: TokenId,
    account: AccountId,
    max_lock: u64,
    positions: HashMap<PositionId, Lock>,
    next_id: PositionId,
    journal: EventJournal,
}

impl VotingEscrow {
    /// Create the escrow over `token` with the given maximum lock duration.
    pub fn new(token: TokenId, max_lock: u64) -> Self {
        Self {
            token,
            account: derived_account(account_domain::ESCROW, 0),
            max_lock,
            positions: HashMap::new(),
            next_id: 1,
            journal: EventJournal::new(),
        }
    }

    /// The governance token locked here.
    pub fn token(&self) -> TokenId {
        self.token
    }

    /// The escrow's custody account.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Maximum lock duration in seconds.
    pub fn max_lock(&self) -> u64 {
        self.max_lock
    }

    /// Events recorded by the escrow, oldest first.
    pub fn events(&self) -> &[Event] {
        self.journal.entries()
    }

    /// Drain the escrow's event journal.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    /// Lock `amount` of the governance token until `unlock_time`, minting
    /// a new position owned by `owner`.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::ZeroAmount`] for a zero amount
    /// - [`EscrowError::UnlockInPast`] if `unlock_time <= now`
    /// - [`EscrowError::ExceedsMaxLock`] beyond the maximum duration
    pub fn create_lock(
        &mut self,
        ledger: &mut TokenLedger,
        owner: &AccountId,
        amount: u64,
        unlock_time: u64,
        now: u64,
    ) -> Result<PositionId> {
        if amount == 0 {
            return Err(EscrowError::ZeroAmount);
        }
        if unlock_time <= now {
            return Err(EscrowError::UnlockInPast {
                unlock: unlock_time,
                now,
            });
        }
        let latest = now + self.max_lock;
        if unlock_time > latest {
            return Err(EscrowError::ExceedsMaxLock {
                unlock: unlock_time,
                latest,
            });
        }

        ledger.transfer(&self.token, owner, &self.account, amount)?;
        let id = self.next_id;
        self.next_id += 1;
        self.positions.insert(
            id,
            Lock {
                owner: *owner,
                amount,
                unlock_time,
            },
        );
        self.journal.record(Event::LockCreated {
            position: id,
            owner: *owner,
            amount,
            unlock_time,
        });
        tracing::info!(position = id, amount, unlock_time, "lock created");
        Ok(id)
    }

    /// The position's live voting power at `now`:
    /// `amount * (unlock_time - now) / max_lock`, zero once expired.
    pub fn voting_power(&self, id: PositionId, now: u64) -> Result<u64> {
        let lock = self.lock(id)?;
        if now >= lock.unlock_time {
            return Ok(0);
        }
        Ok(mul_div(lock.amount, lock.unlock_time - now, self.max_lock)?)
    }

    /// Add `amount` to an unexpired position.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::LockExpired`] if the lock has already expired
    pub fn increase_amount(
        &mut self,
        ledger: &mut TokenLedger,
        id: PositionId,
        owner: &AccountId,
        amount: u64,
        now: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Err(EscrowError::ZeroAmount);
        }
        let escrow_account = self.account;
        let token = self.token;
        let lock = self.lock_owned_mut(id, owner)?;
        if now >= lock.unlock_time {
            return Err(EscrowError::LockExpired { position: id });
        }
        let new_amount = lock
            .amount
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        ledger.transfer(&token, owner, &escrow_account, amount)?;
        // Re-borrow after the ledger call; the position cannot have moved.
        if let Some(lock) = self.positions.get_mut(&id) {
            lock.amount = new_amount;
        }
        self.journal.record(Event::LockIncreased {
            position: id,
            amount,
        });
        Ok(())
    }

    /// Push a position's unlock time further out.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::UnlockNotLater`] unless strictly later than current
    /// - [`EscrowError::ExceedsMaxLock`] beyond `now + max_lock`
    pub fn extend_unlock(
        &mut self,
        id: PositionId,
        owner: &AccountId,
        new_unlock: u64,
        now: u64,
    ) -> Result<()> {
        let latest = now + self.max_lock;
        let lock = self.lock_owned_mut(id, owner)?;
        if new_unlock <= lock.unlock_time {
            return Err(EscrowError::UnlockNotLater {
                current: lock.unlock_time,
                requested: new_unlock,
            });
        }
        if new_unlock > latest {
            return Err(EscrowError::ExceedsMaxLock {
                unlock: new_unlock,
                latest,
            });
        }
        lock.unlock_time = new_unlock;
        self.journal.record(Event::LockExtended {
            position: id,
            unlock_time: new_unlock,
        });
        Ok(())
    }

    /// Merge `from` into `to`: amounts sum, the later unlock time wins,
    /// and the source position is burned.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::SamePosition`] if `from == to`
    /// - [`EscrowError::NotOwner`] unless the caller owns both
    /// - [`EscrowError::EmptyPosition`] if the source holds nothing
    pub fn merge(&mut self, from: PositionId, to: PositionId, caller: &AccountId) -> Result<()> {
        if from == to {
            return Err(EscrowError::SamePosition);
        }
        let source = self.lock_owned(from, caller)?.clone();
        self.lock_owned(to, caller)?;
        if source.amount == 0 {
            return Err(EscrowError::EmptyPosition { position: from });
        }

        let target = self
            .positions
            .get_mut(&to)
            .ok_or(EscrowError::UnknownPosition { position: to })?;
        target.amount = target
            .amount
            .checked_add(source.amount)
            .ok_or(MathError::Overflow)?;
        target.unlock_time = target.unlock_time.max(source.unlock_time);
        let (amount, unlock_time) = (target.amount, target.unlock_time);
        self.positions.remove(&from);
        self.journal.record(Event::LockMerged {
            from,
            into: to,
            amount,
            unlock_time,
        });
        tracing::info!(from, into = to, amount, "locks merged");
        Ok(())
    }

    /// Withdraw an expired position's tokens and burn the position.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotExpired`] before the unlock time
    pub fn withdraw(
        &mut self,
        ledger: &mut TokenLedger,
        id: PositionId,
        caller: &AccountId,
        now: u64,
    ) -> Result<u64> {
        let lock = self.lock_owned(id, caller)?;
        if now < lock.unlock_time {
            return Err(EscrowError::NotExpired {
                unlock: lock.unlock_time,
                now,
            });
        }
        let amount = lock.amount;
        ledger.transfer(&self.token, &self.account, caller, amount)?;
        self.positions.remove(&id);
        self.journal.record(Event::LockWithdrawn {
            position: id,
            owner: *caller,
            amount,
        });
        tracing::info!(position = id, amount, "lock withdrawn");
        Ok(amount)
    }

    /// Transfer exclusive ownership of a position.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::ZeroAddress`] if `to` is the zero account
    pub fn transfer_position(
        &mut self,
        id: PositionId,
        from: &AccountId,
        to: &AccountId,
    ) -> Result<()> {
        if *to == ZERO_ACCOUNT {
            return Err(EscrowError::ZeroAddress);
        }
        let lock = self.lock_owned_mut(id, from)?;
        lock.owner = *to;
        self.journal.record(Event::LockTransferred {
            position: id,
            from: *from,
            to: *to,
        });
        Ok(())
    }

    /// Owner of a position.
    pub fn owner_of(&self, id: PositionId) -> Result<AccountId> {
        Ok(self.lock(id)?.owner)
    }

    /// A position's `(amount, unlock_time)`.
    pub fn locked(&self, id: PositionId) -> Result<(u64, u64)> {
        let lock = self.lock(id)?;
        Ok((lock.amount, lock.unlock_time))
    }

    fn lock(&self, id: PositionId) -> Result<&Lock> {
        self.positions
            .get(&id)
            .ok_or(EscrowError::UnknownPosition { position: id })
    }

    fn lock_owned(&self, id: PositionId, caller: &AccountId) -> Result<&Lock> {
        let lock = self.lock(id)?;
        if lock.owner != *caller {
            return Err(EscrowError::NotOwner { position: id });
        }
        Ok(lock)
    }

    fn lock_owned_mut(&mut self, id: PositionId, caller: &AccountId) -> Result<&mut Lock> {
        let lock = self
            .positions
            .get_mut(&id)
            .ok_or(EscrowError::UnknownPosition { position: id })?;
        if lock.owner != *caller {
            return Err(EscrowError::NotOwner { position: id });
        }
        Ok(lock)
    }
}
