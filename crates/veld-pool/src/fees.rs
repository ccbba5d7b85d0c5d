//! Fees-per-share accrual.
//!
//! Each pool diverts its swap-fee slice to a fee collector account and
//! advances two monotone indices (one per token) by
//! `fee_amount * INDEX_SCALE / share_supply`, using the share supply at
//! the time of the swap. Holders carry a checkpoint of the index at their
//! last interaction plus an accrued-but-unclaimed amount; every share
//! balance change checkpoints the affected holders before balances move,
//! so a holder who transfers shares away stops accruing from that point
//! and the recipient starts from the transfer-time index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use veld_math::{index_delta, index_payout};
use veld_token::TokenLedger;
use veld_types::{AccountId, TokenId, ZERO_ACCOUNT};

use crate::{PoolError, Result};

/// Per-holder fee checkpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Checkpoint {
    index_a: u128,
    index_b: u128,
    owed_a: u64,
    owed_b: u64,
}

/// Fee accrual state for one pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolFees {
    account: AccountId,
    token_a: TokenId,
    token_b: TokenId,
    index_a: u128,
    index_b: u128,
    holders: HashMap<AccountId, Checkpoint>,
}

impl PoolFees {
    pub(crate) fn new(account: AccountId, token_a: TokenId, token_b: TokenId) -> Self {
        Self {
            account,
            token_a,
            token_b,
            index_a: 0,
            index_b: 0,
            holders: HashMap::new(),
        }
    }

    /// The fee collector's token account.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Accrue a fee slice against the share supply at swap time.
    ///
    /// Reachable only from the owning pool's swap path.
    pub(crate) fn notify(&mut self, amount_a: u64, amount_b: u64, supply: u64) -> Result<()> {
        if amount_a > 0 {
            self.index_a += index_delta(amount_a, supply)?;
        }
        if amount_b > 0 {
            self.index_b += index_delta(amount_b, supply)?;
        }
        tracing::trace!(amount_a, amount_b, supply, "pool fees accrued");
        Ok(())
    }

    /// Checkpoint `holder` at the current indices, banking any accrual
    /// earned on `balance` shares since the last checkpoint.
    ///
    /// Must be called with the holder's share balance *before* any change.
    pub(crate) fn update_for(&mut self, holder: &AccountId, balance: u64) -> Result<()> {
        let checkpoint = self.holders.entry(*holder).or_default();
        if balance > 0 {
            let earned_a = index_payout(balance, self.index_a, checkpoint.index_a)?;
            let earned_b = index_payout(balance, self.index_b, checkpoint.index_b)?;
            checkpoint.owed_a = checkpoint
                .owed_a
                .checked_add(earned_a)
                .ok_or(veld_math::MathError::Overflow)?;
            checkpoint.owed_b = checkpoint
                .owed_b
                .checked_add(earned_b)
                .ok_or(veld_math::MathError::Overflow)?;
        }
        checkpoint.index_a = self.index_a;
        checkpoint.index_b = self.index_b;
        Ok(())
    }

    /// Claimable amounts for `holder` at its current share `balance`.
    pub fn claimable(&self, holder: &AccountId, balance: u64) -> Result<(u64, u64)> {
        let checkpoint = self.holders.get(holder).cloned().unwrap_or_default();
        let mut owed_a = checkpoint.owed_a;
        let mut owed_b = checkpoint.owed_b;
        if balance > 0 {
            owed_a = owed_a
                .checked_add(index_payout(balance, self.index_a, checkpoint.index_a)?)
                .ok_or(veld_math::MathError::Overflow)?;
            owed_b = owed_b
                .checked_add(index_payout(balance, self.index_b, checkpoint.index_b)?)
                .ok_or(veld_math::MathError::Overflow)?;
        }
        Ok((owed_a, owed_b))
    }

    /// Pay out `holder`'s accrued fees to `to`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroAddress`] if `to` is the zero account
    /// - [`PoolError::NoFeesToClaim`] if nothing has accrued
    pub(crate) fn claim(
        &mut self,
        ledger: &mut TokenLedger,
        holder: &AccountId,
        to: &AccountId,
        balance: u64,
    ) -> Result<(u64, u64)> {
        if *to == ZERO_ACCOUNT {
            return Err(PoolError::ZeroAddress);
        }
        self.update_for(holder, balance)?;
        let checkpoint = self.holders.entry(*holder).or_default();
        let (owed_a, owed_b) = (checkpoint.owed_a, checkpoint.owed_b);
        if owed_a == 0 && owed_b == 0 {
            return Err(PoolError::NoFeesToClaim);
        }
        checkpoint.owed_a = 0;
        checkpoint.owed_b = 0;
        if owed_a > 0 {
            ledger.transfer(&self.token_a, &self.account, to, owed_a)?;
        }
        if owed_b > 0 {
            ledger.transfer(&self.token_b, &self.account, to, owed_b)?;
        }
        tracing::info!(owed_a, owed_b, "pool fees claimed");
        Ok((owed_a, owed_b))
    }
}
