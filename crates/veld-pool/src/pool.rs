//! Constant-product pool.
//!
//! The pool measures deposits and swap inputs as the difference between
//! its actual token balances and its last-known reserves, so every
//! operation follows the transfer-then-call pattern: the caller moves
//! tokens (or liquidity shares) to the pool's account first, then invokes
//! the state transition. Every mutating operation validates fully before
//! touching the ledger, so a failure leaves no partial state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use veld_math::{isqrt_u128, mul_div, MathError};
use veld_token::TokenLedger;
use veld_types::events::{Event, EventJournal};
use veld_types::{
    account_domain, derived_account, AccountId, PoolId, TokenId, FEE_DENOMINATOR, ZERO_ACCOUNT,
};

use crate::fees::PoolFees;
use crate::{PoolError, Result};

/// A two-token constant-product pool with an internal liquidity-share
/// ledger and a fee collector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pool {
    id: PoolId,
    account: AccountId,
    token_a: TokenId,
    token_b: TokenId,
    stable: bool,
    fee: u64,
    reserve_a: u64,
    reserve_b: u64,
    shares: HashMap<AccountId, u64>,
    total_shares: u64,
    minimum_liquidity: u64,
    fees: PoolFees,
    journal: EventJournal,
}

impl Pool {
    /// Construct a pool. Pools are normally created through the
    /// [`crate::factory::PoolFactory`], which guarantees registry
    /// uniqueness per `(pair, stable)` key.
    pub fn new(
        id: PoolId,
        token_a: TokenId,
        token_b: TokenId,
        stable: bool,
        fee: u64,
        minimum_liquidity: u64,
    ) -> Self {
        let account = derived_account(account_domain::POOL, id);
        let fees_account = derived_account(account_domain::POOL_FEES, id);
        Self {
            id,
            account,
            token_a,
            token_b,
            stable,
            fee,
            reserve_a: 0,
            reserve_b: 0,
            shares: HashMap::new(),
            total_shares: 0,
            minimum_liquidity,
            fees: PoolFees::new(fees_account, token_a, token_b),
            journal: EventJournal::new(),
        }
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    /// The pool's own token account; deposits are transferred here.
    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn token_a(&self) -> TokenId {
        self.token_a
    }

    pub fn token_b(&self) -> TokenId {
        self.token_b
    }

    pub fn stable(&self) -> bool {
        self.stable
    }

    /// Swap fee in units of 1/10,000.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub(crate) fn set_fee(&mut self, fee: u64) {
        self.fee = fee;
    }

    /// Current reserves `(reserve_a, reserve_b)`.
    pub fn reserves(&self) -> (u64, u64) {
        (self.reserve_a, self.reserve_b)
    }

    /// Liquidity-share balance of `holder`.
    pub fn share_balance_of(&self, holder: &AccountId) -> u64 {
        self.shares.get(holder).copied().unwrap_or(0)
    }

    /// Total outstanding liquidity shares.
    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    /// Events recorded by this pool, oldest first.
    pub fn events(&self) -> &[Event] {
        self.journal.entries()
    }

    /// Drain this pool's event journal.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    /// Mint liquidity shares to `to` for the tokens transferred in since
    /// the last reserve update.
    ///
    /// First deposit mints `sqrt(delta_a * delta_b)` shares, of which
    /// `minimum_liquidity` is locked forever under the zero account to pin
    /// the share price at the degenerate empty state. Subsequent deposits
    /// mint `min(delta_a * supply / reserve_a, delta_b * supply / reserve_b)`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroAddress`] if `to` is the zero account
    /// - [`PoolError::InsufficientLiquidity`] if no shares would be minted
    pub fn mint(&mut self, ledger: &TokenLedger, to: &AccountId) -> Result<u64> {
        if *to == ZERO_ACCOUNT {
            return Err(PoolError::ZeroAddress);
        }
        let balance_a = ledger.balance_of(&self.token_a, &self.account);
        let balance_b = ledger.balance_of(&self.token_b, &self.account);
        let delta_a = balance_a.saturating_sub(self.reserve_a);
        let delta_b = balance_b.saturating_sub(self.reserve_b);

        let (locked, shares) = if self.total_shares == 0 {
            let wide = isqrt_u128(delta_a as u128 * delta_b as u128);
            let total = u64::try_from(wide).map_err(|_| MathError::Overflow)?;
            let shares = total
                .checked_sub(self.minimum_liquidity)
                .ok_or(PoolError::InsufficientLiquidity)?;
            (self.minimum_liquidity, shares)
        } else {
            let by_a = mul_div(delta_a, self.total_shares, self.reserve_a)?;
            let by_b = mul_div(delta_b, self.total_shares, self.reserve_b)?;
            (0, by_a.min(by_b))
        };
        if shares == 0 {
            return Err(PoolError::InsufficientLiquidity);
        }

        if locked > 0 {
            self.mint_shares(&ZERO_ACCOUNT, locked)?;
        }
        self.mint_shares(to, shares)?;
        self.update_reserves(balance_a, balance_b);
        self.journal.record(Event::Mint {
            pool: self.id,
            to: *to,
            amount_a: delta_a,
            amount_b: delta_b,
            shares,
        });
        tracing::info!(pool = self.id, shares, delta_a, delta_b, "liquidity minted");
        Ok(shares)
    }

    /// Burn the liquidity shares previously transferred to the pool's own
    /// share account and pay out the proportional reserves to `to`.
    ///
    /// Payouts floor; redeeming the entire supply returns the full
    /// reserves minus at most rounding dust. Never gated by pause.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroAddress`] if `to` is the zero account
    /// - [`PoolError::InsufficientBurn`] if the pool holds no shares or the
    ///   held shares redeem to nothing
    pub fn burn(&mut self, ledger: &mut TokenLedger, to: &AccountId) -> Result<(u64, u64)> {
        if *to == ZERO_ACCOUNT {
            return Err(PoolError::ZeroAddress);
        }
        let held = self.share_balance_of(&self.account);
        if held == 0 {
            return Err(PoolError::InsufficientBurn);
        }
        let balance_a = ledger.balance_of(&self.token_a, &self.account);
        let balance_b = ledger.balance_of(&self.token_b, &self.account);
        let amount_a = mul_div(held, balance_a, self.total_shares)?;
        let amount_b = mul_div(held, balance_b, self.total_shares)?;
        if amount_a == 0 && amount_b == 0 {
            return Err(PoolError::InsufficientBurn);
        }

        let pool_account = self.account;
        self.burn_shares(&pool_account, held)?;
        if amount_a > 0 {
            ledger.transfer(&self.token_a, &self.account, to, amount_a)?;
        }
        if amount_b > 0 {
            ledger.transfer(&self.token_b, &self.account, to, amount_b)?;
        }
        self.update_reserves(balance_a - amount_a, balance_b - amount_b);
        self.journal.record(Event::Burn {
            pool: self.id,
            to: *to,
            amount_a,
            amount_b,
            shares: held,
        });
        tracing::info!(pool = self.id, shares = held, amount_a, amount_b, "liquidity burned");
        Ok((amount_a, amount_b))
    }

    /// Execute a swap: pay out exactly one of the two tokens against the
    /// input the caller already transferred in, diverting the fee slice to
    /// the fee collector and checking the constant-product invariant on
    /// the fee-adjusted balances.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidOut`] unless exactly one output is nonzero
    /// - [`PoolError::InsufficientLiquidity`] if the output reaches the reserve
    /// - [`PoolError::InvalidTo`] for the zero account or a pool-owned account
    /// - [`PoolError::NoInput`] if no net input tokens were received
    /// - [`PoolError::KInvariant`] if the invariant would decrease
    pub fn swap(
        &mut self,
        ledger: &mut TokenLedger,
        amount_a_out: u64,
        amount_b_out: u64,
        to: &AccountId,
    ) -> Result<()> {
        if (amount_a_out == 0) == (amount_b_out == 0) {
            return Err(PoolError::InvalidOut);
        }
        if amount_a_out >= self.reserve_a || amount_b_out >= self.reserve_b {
            return Err(PoolError::InsufficientLiquidity);
        }
        if *to == ZERO_ACCOUNT || *to == self.account || *to == self.fees.account() {
            return Err(PoolError::InvalidTo);
        }

        let balance_a = ledger.balance_of(&self.token_a, &self.account);
        let balance_b = ledger.balance_of(&self.token_b, &self.account);
        let amount_a_in = balance_a.saturating_sub(self.reserve_a);
        let amount_b_in = balance_b.saturating_sub(self.reserve_b);
        if amount_a_in == 0 && amount_b_in == 0 {
            return Err(PoolError::NoInput);
        }

        let fee_a = mul_div(amount_a_in, self.fee, FEE_DENOMINATOR)?;
        let fee_b = mul_div(amount_b_in, self.fee, FEE_DENOMINATOR)?;
        let final_a = balance_a
            .checked_sub(amount_a_out)
            .and_then(|v| v.checked_sub(fee_a))
            .ok_or(PoolError::InsufficientLiquidity)?;
        let final_b = balance_b
            .checked_sub(amount_b_out)
            .and_then(|v| v.checked_sub(fee_b))
            .ok_or(PoolError::InsufficientLiquidity)?;

        let k_before = self.reserve_a as u128 * self.reserve_b as u128;
        let k_after = final_a as u128 * final_b as u128;
        if k_after < k_before {
            return Err(PoolError::KInvariant);
        }

        // All checks passed; commit.
        if amount_a_out > 0 {
            ledger.transfer(&self.token_a, &self.account, to, amount_a_out)?;
        }
        if amount_b_out > 0 {
            ledger.transfer(&self.token_b, &self.account, to, amount_b_out)?;
        }
        if fee_a > 0 {
            ledger.transfer(&self.token_a, &self.account, &self.fees.account(), fee_a)?;
        }
        if fee_b > 0 {
            ledger.transfer(&self.token_b, &self.account, &self.fees.account(), fee_b)?;
        }
        if fee_a > 0 || fee_b > 0 {
            self.fees.notify(fee_a, fee_b, self.total_shares)?;
        }

        self.update_reserves(final_a, final_b);
        self.journal.record(Event::Swap {
            pool: self.id,
            to: *to,
            amount_a_in,
            amount_b_in,
            amount_a_out,
            amount_b_out,
        });
        tracing::info!(
            pool = self.id,
            amount_a_in,
            amount_b_in,
            amount_a_out,
            amount_b_out,
            "swap executed"
        );
        Ok(())
    }

    /// Quote the output amount for swapping `amount_in` of `token_in`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroInput`] for a zero input
    /// - [`PoolError::InvalidToken`] if the token is not in the pair
    pub fn get_amount_out(&self, amount_in: u64, token_in: &TokenId) -> Result<u64> {
        if amount_in == 0 {
            return Err(PoolError::ZeroInput);
        }
        let (reserve_in, reserve_out) = if *token_in == self.token_a {
            (self.reserve_a, self.reserve_b)
        } else if *token_in == self.token_b {
            (self.reserve_b, self.reserve_a)
        } else {
            return Err(PoolError::InvalidToken);
        };

        let fee_complement = FEE_DENOMINATOR
            .checked_sub(self.fee)
            .ok_or(PoolError::InvalidFee { fee: self.fee })?;
        let amount_in_with_fee = (amount_in as u128)
            .checked_mul(fee_complement as u128)
            .ok_or(MathError::Overflow)?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out as u128)
            .ok_or(MathError::Overflow)?;
        let denominator = (reserve_in as u128)
            .checked_mul(FEE_DENOMINATOR as u128)
            .and_then(|v| v.checked_add(amount_in_with_fee))
            .ok_or(MathError::Overflow)?;
        if denominator == 0 {
            return Err(PoolError::InsufficientLiquidity);
        }
        Ok((numerator / denominator) as u64)
    }

    /// Force reserves to match the pool account's actual balances.
    ///
    /// Recovery from direct transfers; emits the updated reserves.
    pub fn sync(&mut self, ledger: &TokenLedger) {
        let balance_a = ledger.balance_of(&self.token_a, &self.account);
        let balance_b = ledger.balance_of(&self.token_b, &self.account);
        self.update_reserves(balance_a, balance_b);
    }

    /// Move liquidity shares between holders, checkpointing both sides'
    /// fee accrual before the balances change.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroAddress`] if `to` is the zero account
    /// - [`PoolError::InsufficientShares`] if `from` holds less than `amount`
    pub fn transfer_shares(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<()> {
        if *to == ZERO_ACCOUNT {
            return Err(PoolError::ZeroAddress);
        }
        let from_balance = self.share_balance_of(from);
        if from_balance < amount {
            return Err(PoolError::InsufficientShares {
                have: from_balance,
                need: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self.share_balance_of(to);
        self.fees.update_for(from, from_balance)?;
        self.fees.update_for(to, to_balance)?;
        self.shares.insert(*from, from_balance - amount);
        let to_after = to_balance
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        self.shares.insert(*to, to_after);
        Ok(())
    }

    /// Claimable fee amounts for `holder` at its current share balance.
    pub fn claimable_fees(&self, holder: &AccountId) -> Result<(u64, u64)> {
        self.fees.claimable(holder, self.share_balance_of(holder))
    }

    /// Pay out `holder`'s accrued fees to `to`.
    pub fn claim_fees(
        &mut self,
        ledger: &mut TokenLedger,
        holder: &AccountId,
        to: &AccountId,
    ) -> Result<(u64, u64)> {
        let balance = self.share_balance_of(holder);
        let (amount_a, amount_b) = self.fees.claim(ledger, holder, to, balance)?;
        self.journal.record(Event::FeesClaimed {
            pool: self.id,
            holder: *holder,
            to: *to,
            amount_a,
            amount_b,
        });
        Ok((amount_a, amount_b))
    }

    fn mint_shares(&mut self, to: &AccountId, amount: u64) -> Result<()> {
        let balance = self.share_balance_of(to);
        self.fees.update_for(to, balance)?;
        self.total_shares = self
            .total_shares
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        let after = balance.checked_add(amount).ok_or(MathError::Overflow)?;
        self.shares.insert(*to, after);
        Ok(())
    }

    fn burn_shares(&mut self, from: &AccountId, amount: u64) -> Result<()> {
        let balance = self.share_balance_of(from);
        if balance < amount {
            return Err(PoolError::InsufficientShares {
                have: balance,
                need: amount,
            });
        }
        self.fees.update_for(from, balance)?;
        self.shares.insert(*from, balance - amount);
        self.total_shares -= amount;
        Ok(())
    }

    fn update_reserves(&mut self, balance_a: u64, balance_b: u64) {
        self.reserve_a = balance_a;
        self.reserve_b = balance_b;
        self.journal.record(Event::Sync {
            pool: self.id,
            reserve_a: balance_a,
            reserve_b: balance_b,
        });
        tracing::debug!(pool = self.id, balance_a, balance_b, "reserves updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_types::UNITS_PER_TOKEN;

    const TOKEN_A: TokenId = [0xA1; 32];
    const TOKEN_B: TokenId = [0xB1; 32];
    const ALICE: AccountId = [0x01; 32];
    const BOB: AccountId = [0x02; 32];
    const CAROL: AccountId = [0x03; 32];

    const MINIMUM_LIQUIDITY: u64 = 1_000;

    fn tokens(n: u64) -> u64 {
        n * UNITS_PER_TOKEN
    }

    fn setup() -> (Pool, TokenLedger) {
        let pool = Pool::new(1, TOKEN_A, TOKEN_B, false, 30, MINIMUM_LIQUIDITY);
        let mut ledger = TokenLedger::new();
        ledger.register(TOKEN_A).expect("register a");
        ledger.register(TOKEN_B).expect("register b");
        for user in [ALICE, BOB, CAROL] {
            ledger.mint(&TOKEN_A, &user, tokens(10_000)).expect("fund a");
            ledger.mint(&TOKEN_B, &user, tokens(10_000)).expect("fund b");
        }
        (pool, ledger)
    }

    fn add_liquidity(
        pool: &mut Pool,
        ledger: &mut TokenLedger,
        user: &AccountId,
        amount_a: u64,
        amount_b: u64,
    ) -> u64 {
        ledger
            .transfer(&TOKEN_A, user, &pool.account(), amount_a)
            .expect("transfer a");
        ledger
            .transfer(&TOKEN_B, user, &pool.account(), amount_b)
            .expect("transfer b");
        pool.mint(ledger, user).expect("mint")
    }

    #[test]
    fn test_first_mint_locks_minimum_liquidity() {
        let (mut pool, mut ledger) = setup();
        let shares = add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(100), tokens(100));
        assert_eq!(shares, tokens(100) - MINIMUM_LIQUIDITY);
        assert_eq!(pool.share_balance_of(&ZERO_ACCOUNT), MINIMUM_LIQUIDITY);
        assert_eq!(pool.total_shares(), tokens(100));
        assert_eq!(pool.reserves(), (tokens(100), tokens(100)));
    }

    #[test]
    fn test_mint_without_deposit_rejected() {
        let (mut pool, ledger) = setup();
        assert_eq!(pool.mint(&ledger, &ALICE), Err(PoolError::InsufficientLiquidity));
    }

    #[test]
    fn test_mint_to_zero_rejected() {
        let (mut pool, ledger) = setup();
        assert_eq!(pool.mint(&ledger, &ZERO_ACCOUNT), Err(PoolError::ZeroAddress));
    }

    #[test]
    fn test_subsequent_mint_proportional() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(100), tokens(100));
        let bob_shares = add_liquidity(&mut pool, &mut ledger, &BOB, tokens(50), tokens(50));
        // Half the pool's reserves mints half the outstanding supply.
        assert_eq!(bob_shares, tokens(50));
    }

    #[test]
    fn test_lopsided_mint_takes_min_side() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(100), tokens(100));
        let shares = add_liquidity(&mut pool, &mut ledger, &BOB, tokens(50), tokens(10));
        assert_eq!(shares, tokens(10));
    }

    #[test]
    fn test_burn_returns_proportional_amounts() {
        let (mut pool, mut ledger) = setup();
        let shares = add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(100), tokens(100));

        let pool_account = pool.account();
        pool.transfer_shares(&ALICE, &pool_account, shares)
            .expect("return shares");
        let (out_a, out_b) = pool.burn(&mut ledger, &ALICE).expect("burn");

        // Everything except the locked minimum-liquidity slice comes back.
        let expected = mul_div(shares, tokens(100), tokens(100)).expect("expected");
        assert_eq!(out_a, expected);
        assert_eq!(out_b, expected);
        assert!(tokens(100) - out_a <= MINIMUM_LIQUIDITY);
        assert_eq!(pool.share_balance_of(&ALICE), 0);
    }

    #[test]
    fn test_burn_without_shares_rejected() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(100), tokens(100));
        assert_eq!(pool.burn(&mut ledger, &ALICE), Err(PoolError::InsufficientBurn));
    }

    #[test]
    fn test_burn_to_zero_rejected() {
        let (mut pool, mut ledger) = setup();
        let shares = add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(100), tokens(100));
        let pool_account = pool.account();
        pool.transfer_shares(&ALICE, &pool_account, shares)
            .expect("return shares");
        assert_eq!(
            pool.burn(&mut ledger, &ZERO_ACCOUNT),
            Err(PoolError::ZeroAddress)
        );
    }

    #[test]
    fn test_swap_happy_path() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));

        let swap_in = tokens(10);
        let quote = pool.get_amount_out(swap_in, &TOKEN_A).expect("quote");
        assert!(quote > 0 && quote < swap_in, "fee makes output strictly less than input");

        ledger
            .transfer(&TOKEN_A, &BOB, &pool.account(), swap_in)
            .expect("transfer in");
        let before = ledger.balance_of(&TOKEN_B, &BOB);
        pool.swap(&mut ledger, 0, quote, &BOB).expect("swap");
        assert_eq!(ledger.balance_of(&TOKEN_B, &BOB) - before, quote);

        // Reserves track actual balances.
        let (ra, rb) = pool.reserves();
        assert_eq!(ra, ledger.balance_of(&TOKEN_A, &pool.account()));
        assert_eq!(rb, ledger.balance_of(&TOKEN_B, &pool.account()));
    }

    #[test]
    fn test_swap_k_never_decreases() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));
        let (ra0, rb0) = pool.reserves();
        let k_before = ra0 as u128 * rb0 as u128;

        let swap_in = tokens(37);
        let quote = pool.get_amount_out(swap_in, &TOKEN_B).expect("quote");
        ledger
            .transfer(&TOKEN_B, &BOB, &pool.account(), swap_in)
            .expect("transfer in");
        pool.swap(&mut ledger, quote, 0, &BOB).expect("swap");

        let (ra1, rb1) = pool.reserves();
        assert!(ra1 as u128 * rb1 as u128 >= k_before);
    }

    #[test]
    fn test_swap_invalid_out() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));
        assert_eq!(pool.swap(&mut ledger, 0, 0, &BOB), Err(PoolError::InvalidOut));
        assert_eq!(pool.swap(&mut ledger, 1, 1, &BOB), Err(PoolError::InvalidOut));
    }

    #[test]
    fn test_swap_exceeding_reserve_rejected() {
        let (mut pool, mut ledger) = setup();
        // Empty pool: any requested output exceeds the zero reserve.
        assert_eq!(
            pool.swap(&mut ledger, tokens(1), 0, &BOB),
            Err(PoolError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_swap_invalid_to() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));
        assert_eq!(
            pool.swap(&mut ledger, 0, tokens(1), &ZERO_ACCOUNT),
            Err(PoolError::InvalidTo)
        );
        let pool_account = pool.account();
        assert_eq!(
            pool.swap(&mut ledger, 0, tokens(1), &pool_account),
            Err(PoolError::InvalidTo)
        );
    }

    #[test]
    fn test_swap_no_input() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));
        assert_eq!(
            pool.swap(&mut ledger, 0, tokens(1), &BOB),
            Err(PoolError::NoInput)
        );
    }

    #[test]
    fn test_swap_k_invariant_rejects_disproportionate_output() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));

        // Tiny input, moderate requested output.
        let small_in = UNITS_PER_TOKEN / 1_000;
        ledger
            .transfer(&TOKEN_A, &BOB, &pool.account(), small_in)
            .expect("transfer in");
        assert_eq!(
            pool.swap(&mut ledger, 0, tokens(100), &BOB),
            Err(PoolError::KInvariant)
        );
        // The failed swap left no partial state.
        assert_eq!(pool.reserves(), (tokens(1_000), tokens(1_000)));
    }

    #[test]
    fn test_get_amount_out_validation() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));
        assert_eq!(pool.get_amount_out(0, &TOKEN_A), Err(PoolError::ZeroInput));
        assert_eq!(
            pool.get_amount_out(tokens(1), &[0xEE; 32]),
            Err(PoolError::InvalidToken)
        );
    }

    #[test]
    fn test_sync_matches_direct_transfers() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));

        ledger
            .transfer(&TOKEN_A, &ALICE, &pool.account(), tokens(100))
            .expect("direct transfer");
        ledger
            .transfer(&TOKEN_B, &ALICE, &pool.account(), tokens(100))
            .expect("direct transfer");
        pool.sync(&ledger);

        assert_eq!(pool.reserves(), (tokens(1_100), tokens(1_100)));
        let last = pool.events().last().cloned().expect("sync event");
        assert_eq!(
            last,
            Event::Sync {
                pool: 1,
                reserve_a: tokens(1_100),
                reserve_b: tokens(1_100),
            }
        );
    }

    #[test]
    fn test_fee_accrual_fairness_across_share_transfer() {
        let (mut pool, mut ledger) = setup();
        let shares = add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));

        // Alice hands all shares to Bob before any fee-generating swap.
        pool.transfer_shares(&ALICE, &BOB, shares).expect("transfer shares");

        let swap_in = tokens(50);
        let quote = pool.get_amount_out(swap_in, &TOKEN_A).expect("quote");
        ledger
            .transfer(&TOKEN_A, &CAROL, &pool.account(), swap_in)
            .expect("transfer in");
        pool.swap(&mut ledger, 0, quote, &CAROL).expect("swap");

        let (alice_a, alice_b) = pool.claimable_fees(&ALICE).expect("alice claimable");
        assert_eq!(alice_a + alice_b, 0, "former holder accrues nothing");
        let (bob_a, _) = pool.claimable_fees(&BOB).expect("bob claimable");
        assert!(bob_a > 0, "new holder accrues the swap fee");

        assert_eq!(
            pool.claim_fees(&mut ledger, &ALICE, &ALICE),
            Err(PoolError::NoFeesToClaim)
        );
        let (claimed_a, _) = pool.claim_fees(&mut ledger, &BOB, &BOB).expect("bob claims");
        assert_eq!(claimed_a, bob_a);
    }

    #[test]
    fn test_swap_fee_goes_to_collector() {
        let (mut pool, mut ledger) = setup();
        add_liquidity(&mut pool, &mut ledger, &ALICE, tokens(1_000), tokens(1_000));

        let swap_in = tokens(100);
        let quote = pool.get_amount_out(swap_in, &TOKEN_A).expect("quote");
        ledger
            .transfer(&TOKEN_A, &BOB, &pool.account(), swap_in)
            .expect("transfer in");
        pool.swap(&mut ledger, 0, quote, &BOB).expect("swap");

        // 0.30% of the input.
        let expected_fee = mul_div(swap_in, 30, FEE_DENOMINATOR).expect("fee");
        assert_eq!(
            ledger.balance_of(&TOKEN_A, &pool.fees.account()),
            expected_fee
        );
    }
}
