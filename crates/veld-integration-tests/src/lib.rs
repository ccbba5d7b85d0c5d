//! Integration test crate for the Veld protocol.
//!
//! This crate has no library code beyond shared fixtures — the tests
//! exercise end-to-end protocol flows across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p veld-integration-tests
//! ```

use veld_exchange::Exchange;
use veld_types::config::ProtocolConfig;
use veld_types::{AccountId, TokenId, UNITS_PER_TOKEN};

/// Governance token id used across fixtures.
pub const GOV: TokenId = [0x60; 32];
/// First pair token.
pub const TOKEN_A: TokenId = [0xA1; 32];
/// Second pair token.
pub const TOKEN_B: TokenId = [0xB1; 32];

/// The deployer, holding every administrative role initially.
pub const ADMIN: AccountId = [0x10; 32];
/// The designated keeper.
pub const KEEPER: AccountId = [0x20; 32];
pub const USER_1: AccountId = [0x01; 32];
pub const USER_2: AccountId = [0x02; 32];
pub const USER_3: AccountId = [0x03; 32];

/// One epoch, in seconds.
pub const WEEK: u64 = 604_800;

/// Whole tokens in base units.
pub fn tokens(n: u64) -> u64 {
    n * UNITS_PER_TOKEN
}

/// A freshly deployed exchange: governance and pair tokens registered,
/// users funded, keeper assigned.
pub fn deploy(now: u64) -> Exchange {
    let mut exchange =
        Exchange::new(ProtocolConfig::default(), ADMIN, GOV, now).expect("construct exchange");
    exchange.register_token(TOKEN_A).expect("register token a");
    exchange.register_token(TOKEN_B).expect("register token b");

    let ledger = exchange.ledger_mut();
    for user in [USER_1, USER_2, USER_3] {
        ledger.mint(&GOV, &user, tokens(10_000)).expect("fund gov");
        ledger.mint(&TOKEN_A, &user, tokens(10_000)).expect("fund a");
        ledger.mint(&TOKEN_B, &user, tokens(10_000)).expect("fund b");
    }
    exchange.set_keeper(&ADMIN, KEEPER).expect("assign keeper");
    exchange
}

/// Transfer a pair deposit into `pool` and mint shares to `user`.
pub fn add_liquidity(exchange: &mut Exchange, pool: u64, user: &AccountId, amount: u64) -> u64 {
    let account = exchange.pool(pool).expect("pool").account();
    let ledger = exchange.ledger_mut();
    ledger
        .transfer(&TOKEN_A, user, &account, amount)
        .expect("transfer token a");
    ledger
        .transfer(&TOKEN_B, user, &account, amount)
        .expect("transfer token b");
    exchange.mint(pool, user).expect("mint liquidity")
}

/// Transfer `amount` of `token_in` into `pool` and swap at the quoted
/// output for `user`. Returns the output amount.
pub fn swap_exact_in(
    exchange: &mut Exchange,
    pool: u64,
    user: &AccountId,
    token_in: &TokenId,
    amount_in: u64,
) -> u64 {
    let quote = exchange
        .get_amount_out(pool, amount_in, token_in)
        .expect("quote");
    let account = exchange.pool(pool).expect("pool").account();
    exchange
        .ledger_mut()
        .transfer(token_in, user, &account, amount_in)
        .expect("transfer in");
    let (amount_a_out, amount_b_out) = if *token_in == TOKEN_A {
        (0, quote)
    } else {
        (quote, 0)
    };
    exchange
        .swap(pool, amount_a_out, amount_b_out, user)
        .expect("swap");
    quote
}
