//! Balance and allowance bookkeeping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use veld_types::{AccountId, TokenId, ZERO_ACCOUNT};

use crate::{Result, TokenError};

/// Per-token state: balances and approvals.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TokenState {
    balances: HashMap<AccountId, u64>,
    allowances: HashMap<(AccountId, AccountId), u64>,
    total_supply: u64,
}

/// The fungible-token ledger.
///
/// Tokens must be registered before use. Balances are `u64` base units;
/// the total supply of a token can never exceed `u64::MAX`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    tokens: HashMap<TokenId, TokenState>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new token.
    ///
    /// # Errors
    ///
    /// - [`TokenError::TokenExists`] if already registered
    pub fn register(&mut self, token: TokenId) -> Result<()> {
        if self.tokens.contains_key(&token) {
            return Err(TokenError::TokenExists);
        }
        self.tokens.insert(token, TokenState::default());
        tracing::debug!(token = token[0], "ledger: token registered");
        Ok(())
    }

    /// Whether a token is registered.
    pub fn is_registered(&self, token: &TokenId) -> bool {
        self.tokens.contains_key(token)
    }

    /// Balance of `holder` for `token`. Zero for unknown holders.
    pub fn balance_of(&self, token: &TokenId, holder: &AccountId) -> u64 {
        self.tokens
            .get(token)
            .and_then(|t| t.balances.get(holder))
            .copied()
            .unwrap_or(0)
    }

    /// Total minted supply of `token`.
    pub fn total_supply(&self, token: &TokenId) -> u64 {
        self.tokens.get(token).map(|t| t.total_supply).unwrap_or(0)
    }

    /// Mint `amount` of `token` to `to`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::UnknownToken`] if the token is not registered
    /// - [`TokenError::ZeroAddress`] if `to` is the zero account
    /// - [`TokenError::Overflow`] if the supply or balance would overflow
    pub fn mint(&mut self, token: &TokenId, to: &AccountId, amount: u64) -> Result<()> {
        if *to == ZERO_ACCOUNT {
            return Err(TokenError::ZeroAddress);
        }
        let state = self.tokens.get_mut(token).ok_or(TokenError::UnknownToken)?;
        state.total_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = state.balances.entry(*to).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Burn `amount` of `token` from `from`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::UnknownToken`] if the token is not registered
    /// - [`TokenError::InsufficientBalance`] if `from` holds less than `amount`
    pub fn burn(&mut self, token: &TokenId, from: &AccountId, amount: u64) -> Result<()> {
        let state = self.tokens.get_mut(token).ok_or(TokenError::UnknownToken)?;
        let balance = state.balances.entry(*from).or_insert(0);
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: *balance,
                need: amount,
            });
        }
        *balance -= amount;
        state.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` of `token` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::UnknownToken`] if the token is not registered
    /// - [`TokenError::ZeroAddress`] if `to` is the zero account
    /// - [`TokenError::InsufficientBalance`] if `from` holds less than `amount`
    pub fn transfer(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<()> {
        if *to == ZERO_ACCOUNT {
            return Err(TokenError::ZeroAddress);
        }
        let state = self.tokens.get_mut(token).ok_or(TokenError::UnknownToken)?;
        let from_balance = state.balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }
        // A self-transfer must not change the balance.
        if from == to {
            return Ok(());
        }
        let to_balance = state.balances.get(to).copied().unwrap_or(0);
        let to_after = to_balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        state.balances.insert(*from, from_balance - amount);
        state.balances.insert(*to, to_after);
        Ok(())
    }

    /// Approve `spender` to move up to `amount` of `owner`'s `token`.
    pub fn approve(
        &mut self,
        token: &TokenId,
        owner: &AccountId,
        spender: &AccountId,
        amount: u64,
    ) -> Result<()> {
        if *spender == ZERO_ACCOUNT {
            return Err(TokenError::ZeroAddress);
        }
        let state = self.tokens.get_mut(token).ok_or(TokenError::UnknownToken)?;
        state.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    /// Remaining allowance from `owner` to `spender`.
    pub fn allowance(&self, token: &TokenId, owner: &AccountId, spender: &AccountId) -> u64 {
        self.tokens
            .get(token)
            .and_then(|t| t.allowances.get(&(*owner, *spender)))
            .copied()
            .unwrap_or(0)
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientAllowance`] if the approved amount is too low
    /// - plus every [`Self::transfer`] error
    pub fn transfer_from(
        &mut self,
        token: &TokenId,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<()> {
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                have: allowed,
                need: amount,
            });
        }
        self.transfer(token, from, to, amount)?;
        if let Some(state) = self.tokens.get_mut(token) {
            state.allowances.insert((*from, *spender), allowed - amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: TokenId = [0xAA; 32];
    const ALICE: AccountId = [0x01; 32];
    const BOB: AccountId = [0x02; 32];

    fn ledger_with_balance(amount: u64) -> TokenLedger {
        let mut ledger = TokenLedger::new();
        ledger.register(TOKEN).expect("register");
        ledger.mint(&TOKEN, &ALICE, amount).expect("mint");
        ledger
    }

    #[test]
    fn test_register_twice_rejected() {
        let mut ledger = TokenLedger::new();
        ledger.register(TOKEN).expect("register");
        assert_eq!(ledger.register(TOKEN), Err(TokenError::TokenExists));
    }

    #[test]
    fn test_mint_and_balance() {
        let ledger = ledger_with_balance(1_000);
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 1_000);
        assert_eq!(ledger.total_supply(&TOKEN), 1_000);
    }

    #[test]
    fn test_mint_unknown_token() {
        let mut ledger = TokenLedger::new();
        assert_eq!(
            ledger.mint(&TOKEN, &ALICE, 1),
            Err(TokenError::UnknownToken)
        );
    }

    #[test]
    fn test_transfer_moves_exact_amount() {
        let mut ledger = ledger_with_balance(1_000);
        ledger.transfer(&TOKEN, &ALICE, &BOB, 300).expect("transfer");
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 700);
        assert_eq!(ledger.balance_of(&TOKEN, &BOB), 300);
        assert_eq!(ledger.total_supply(&TOKEN), 1_000);
    }

    #[test]
    fn test_transfer_insufficient() {
        let mut ledger = ledger_with_balance(10);
        let err = ledger.transfer(&TOKEN, &ALICE, &BOB, 11).expect_err("too much");
        assert_eq!(err, TokenError::InsufficientBalance { have: 10, need: 11 });
        // No partial effect.
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 10);
    }

    #[test]
    fn test_transfer_to_zero_rejected() {
        let mut ledger = ledger_with_balance(10);
        assert_eq!(
            ledger.transfer(&TOKEN, &ALICE, &ZERO_ACCOUNT, 1),
            Err(TokenError::ZeroAddress)
        );
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut ledger = ledger_with_balance(10);
        ledger.transfer(&TOKEN, &ALICE, &ALICE, 7).expect("self transfer");
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 10);
    }

    #[test]
    fn test_burn() {
        let mut ledger = ledger_with_balance(1_000);
        ledger.burn(&TOKEN, &ALICE, 400).expect("burn");
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 600);
        assert_eq!(ledger.total_supply(&TOKEN), 600);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = ledger_with_balance(1_000);
        ledger.approve(&TOKEN, &ALICE, &BOB, 500).expect("approve");
        ledger
            .transfer_from(&TOKEN, &BOB, &ALICE, &BOB, 200)
            .expect("transfer_from");
        assert_eq!(ledger.balance_of(&TOKEN, &BOB), 200);
        assert_eq!(ledger.allowance(&TOKEN, &ALICE, &BOB), 300);
    }

    #[test]
    fn test_transfer_from_over_allowance() {
        let mut ledger = ledger_with_balance(1_000);
        ledger.approve(&TOKEN, &ALICE, &BOB, 100).expect("approve");
        let err = ledger
            .transfer_from(&TOKEN, &BOB, &ALICE, &BOB, 101)
            .expect_err("over allowance");
        assert_eq!(
            err,
            TokenError::InsufficientAllowance { have: 100, need: 101 }
        );
    }

    #[test]
    fn test_transfer_from_failed_transfer_keeps_allowance() {
        let mut ledger = ledger_with_balance(50);
        ledger.approve(&TOKEN, &ALICE, &BOB, 100).expect("approve");
        // Allowance covers it, balance does not.
        let err = ledger
            .transfer_from(&TOKEN, &BOB, &ALICE, &BOB, 80)
            .expect_err("insufficient balance");
        assert_eq!(err, TokenError::InsufficientBalance { have: 50, need: 80 });
        assert_eq!(ledger.allowance(&TOKEN, &ALICE, &BOB), 100);
    }

    #[test]
    fn test_mint_overflow() {
        let mut ledger = ledger_with_balance(u64::MAX - 1);
        assert_eq!(ledger.mint(&TOKEN, &ALICE, 2), Err(TokenError::Overflow));
    }
}
