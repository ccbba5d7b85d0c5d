//! Integration test: pool lifecycle.
//!
//! Exercises the full liquidity-provider and trader journey:
//! 1. Create a volatile pool through the factory
//! 2. Add liquidity (first and subsequent deposits)
//! 3. Swap against the pool at the quoted price
//! 4. Claim accrued swap fees
//! 5. Burn the liquidity shares back to tokens
//! 6. Fee-accrual fairness across a share transfer
//! 7. Pause behavior: mint/swap blocked, burn still possible

use veld_integration_tests::{
    add_liquidity, deploy, swap_exact_in, tokens, ADMIN, TOKEN_A, TOKEN_B, USER_1, USER_2, USER_3,
};
use veld_pool::PoolError;
use veld_exchange::ExchangeError;

#[test]
fn full_journey_create_lp_swap_claim_burn() {
    let mut exchange = deploy(0);

    // =========================================================
    // Create the pool and seed liquidity
    // =========================================================
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    let shares = add_liquidity(&mut exchange, pool, &USER_1, tokens(1_000));
    assert!(shares > 0);
    assert_eq!(
        exchange.pool(pool).expect("pool").reserves(),
        (tokens(1_000), tokens(1_000))
    );

    // =========================================================
    // Swap 10 tokens in; output is positive and below input
    // =========================================================
    let out = swap_exact_in(&mut exchange, pool, &USER_2, &TOKEN_A, tokens(10));
    assert!(out > 0 && out < tokens(10));

    // =========================================================
    // The LP claims the swap fee
    // =========================================================
    let (claimable_a, claimable_b) = exchange
        .claimable_fees(pool, &USER_1)
        .expect("claimable");
    assert!(claimable_a + claimable_b > 0);

    let before = exchange.ledger().balance_of(&TOKEN_A, &USER_1);
    exchange
        .claim_fees(pool, &USER_1, &USER_1)
        .expect("claim fees");
    assert!(exchange.ledger().balance_of(&TOKEN_A, &USER_1) >= before);

    // =========================================================
    // Burn everything back
    // =========================================================
    let account = exchange.pool(pool).expect("pool").account();
    exchange
        .transfer_liquidity(pool, &USER_1, &account, shares)
        .expect("return shares");
    let (out_a, out_b) = exchange.burn(pool, &USER_1).expect("burn");
    assert!(out_a > 0 && out_b > 0);
    assert_eq!(
        exchange.pool(pool).expect("pool").share_balance_of(&USER_1),
        0
    );
}

#[test]
fn subsequent_deposit_mints_proportional_shares() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");

    add_liquidity(&mut exchange, pool, &USER_1, tokens(100));
    let second = add_liquidity(&mut exchange, pool, &USER_2, tokens(100));
    // Equal deposit into an unmoved pool mints the same share count as
    // the total outstanding before it.
    assert_eq!(second, tokens(100));
}

#[test]
fn redeeming_full_supply_returns_reserves_minus_dust() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");

    let shares_1 = add_liquidity(&mut exchange, pool, &USER_1, tokens(400));
    let shares_2 = add_liquidity(&mut exchange, pool, &USER_2, tokens(600));

    let account = exchange.pool(pool).expect("pool").account();
    exchange
        .transfer_liquidity(pool, &USER_1, &account, shares_1)
        .expect("return shares");
    let (a1, b1) = exchange.burn(pool, &USER_1).expect("burn user 1");
    exchange
        .transfer_liquidity(pool, &USER_2, &account, shares_2)
        .expect("return shares");
    let (a2, b2) = exchange.burn(pool, &USER_2).expect("burn user 2");

    // Total redeemed never exceeds total deposited, and the shortfall is
    // only the permanently locked minimum-liquidity slice.
    let deposited = tokens(1_000);
    assert!(a1 + a2 <= deposited);
    assert!(b1 + b2 <= deposited);
    assert!(deposited - (a1 + a2) <= exchange.config().minimum_liquidity + 1);
    assert!(deposited - (b1 + b2) <= exchange.config().minimum_liquidity + 1);
}

#[test]
fn former_holder_stops_accruing_after_share_transfer() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    let shares = add_liquidity(&mut exchange, pool, &USER_1, tokens(1_000));

    // User 1 hands the whole stake to user 2, then a swap generates fees.
    exchange
        .transfer_liquidity(pool, &USER_1, &USER_2, shares)
        .expect("transfer shares");
    swap_exact_in(&mut exchange, pool, &USER_3, &TOKEN_A, tokens(50));

    let (u1_a, u1_b) = exchange.claimable_fees(pool, &USER_1).expect("user 1");
    let (u2_a, u2_b) = exchange.claimable_fees(pool, &USER_2).expect("user 2");
    assert_eq!(u1_a + u1_b, 0, "former holder accrues nothing");
    assert!(u2_a + u2_b > 0, "new holder accrues the fee");

    assert!(matches!(
        exchange.claim_fees(pool, &USER_1, &USER_1),
        Err(ExchangeError::Pool(PoolError::NoFeesToClaim))
    ));
    exchange
        .claim_fees(pool, &USER_2, &USER_2)
        .expect("new holder claims");
}

#[test]
fn double_claim_without_new_fees_rejected() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    add_liquidity(&mut exchange, pool, &USER_1, tokens(1_000));
    swap_exact_in(&mut exchange, pool, &USER_2, &TOKEN_A, tokens(25));

    exchange
        .claim_fees(pool, &USER_1, &USER_1)
        .expect("first claim");
    assert!(matches!(
        exchange.claim_fees(pool, &USER_1, &USER_1),
        Err(ExchangeError::Pool(PoolError::NoFeesToClaim))
    ));

    // A user who never provided liquidity has nothing to claim.
    assert!(matches!(
        exchange.claim_fees(pool, &USER_2, &USER_2),
        Err(ExchangeError::Pool(PoolError::NoFeesToClaim))
    ));
}

#[test]
fn crafted_swap_with_tiny_input_hits_k_invariant() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    add_liquidity(&mut exchange, pool, &USER_1, tokens(1_000));

    let account = exchange.pool(pool).expect("pool").account();
    exchange
        .ledger_mut()
        .transfer(&TOKEN_A, &USER_2, &account, tokens(1) / 1_000)
        .expect("tiny input");
    assert!(matches!(
        exchange.swap(pool, 0, tokens(100), &USER_2),
        Err(ExchangeError::Pool(PoolError::KInvariant))
    ));
}

#[test]
fn sync_after_direct_transfer_matches_balances() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    add_liquidity(&mut exchange, pool, &USER_1, tokens(1_000));

    let account = exchange.pool(pool).expect("pool").account();
    exchange
        .ledger_mut()
        .transfer(&TOKEN_A, &USER_1, &account, tokens(100))
        .expect("direct transfer a");
    exchange
        .ledger_mut()
        .transfer(&TOKEN_B, &USER_1, &account, tokens(100))
        .expect("direct transfer b");
    exchange.sync(pool).expect("sync");

    assert_eq!(
        exchange.pool(pool).expect("pool").reserves(),
        (tokens(1_100), tokens(1_100))
    );
}

#[test]
fn pause_blocks_mint_and_swap_but_not_burn() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    let shares = add_liquidity(&mut exchange, pool, &USER_1, tokens(100));

    exchange.set_pause(&ADMIN, true).expect("pause");

    let account = exchange.pool(pool).expect("pool").account();
    exchange
        .ledger_mut()
        .transfer(&TOKEN_A, &USER_1, &account, tokens(1))
        .expect("transfer");
    assert!(matches!(
        exchange.mint(pool, &USER_1),
        Err(ExchangeError::Pool(PoolError::Paused))
    ));
    assert!(matches!(
        exchange.swap(pool, 0, tokens(1), &USER_1),
        Err(ExchangeError::Pool(PoolError::Paused))
    ));
    assert!(matches!(
        exchange.create_pool(&TOKEN_A, &TOKEN_B, true),
        Err(ExchangeError::Pool(PoolError::FactoryPaused))
    ));

    // Withdrawal still possible while paused.
    exchange
        .transfer_liquidity(pool, &USER_1, &account, shares)
        .expect("return shares");
    exchange.burn(pool, &USER_1).expect("burn while paused");
}
