//! Integration test: ve(3,3) lifecycle.
//!
//! Exercises the lock → vote → distribute → stake → claim journey and the
//! bribe flow:
//! 1. Lock governance tokens into a voting position
//! 2. Vote 99% of the resulting power on a pool
//! 3. Stake liquidity shares in the pool's gauge
//! 4. Distribute emission and claim the gauge reward
//! 5. Fund and claim an epoch bribe
//! 6. Unhappy paths: bad lock times, over-power votes, duplicate
//!    distribution, early bribe claims

use veld_bribe::BribeError;
use veld_escrow::EscrowError;
use veld_exchange::ExchangeError;
use veld_integration_tests::{
    add_liquidity, deploy, tokens, KEEPER, TOKEN_A, TOKEN_B, USER_1, USER_2, WEEK,
};
use veld_types::MAX_LOCK_DURATION_SECS;
use veld_voter::VoterError;

#[test]
fn lock_vote_distribute_and_claim_reward() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    add_liquidity(&mut exchange, pool, &USER_1, tokens(1_000));

    // =========================================================
    // Lock 100 tokens for the maximum duration
    // =========================================================
    let position = exchange
        .create_lock(&USER_1, tokens(100), MAX_LOCK_DURATION_SECS, 0)
        .expect("create lock");
    let power = exchange.voting_power(position, 0).expect("power");
    assert_eq!(power, tokens(100), "max-duration lock has full power");

    // =========================================================
    // Vote 99% of the power on the pool
    // =========================================================
    let weight = power * 99 / 100;
    exchange
        .vote(position, &USER_1, &[pool], &[weight], 0)
        .expect("vote");
    assert_eq!(exchange.voter().pool_weight(pool), weight);
    assert_eq!(exchange.voter().total_weight(), weight);

    // =========================================================
    // Stake the LP shares in the gauge
    // =========================================================
    let shares = exchange.pool(pool).expect("pool").share_balance_of(&USER_1);
    exchange
        .gauge_deposit(pool, &USER_1, shares, 0)
        .expect("stake");

    // =========================================================
    // Distribute 500 tokens of emission; the only voted pool gets all
    // =========================================================
    let emission = tokens(500);
    let voter_account = exchange.voter().account();
    exchange
        .ledger_mut()
        .mint(&veld_integration_tests::GOV, &voter_account, emission)
        .expect("fund voter");
    exchange
        .distribute_all(emission, &KEEPER, 0)
        .expect("distribute");

    let gauge_account = exchange.voter().gauge(pool).expect("gauge").account();
    assert_eq!(
        exchange
            .ledger()
            .balance_of(&veld_integration_tests::GOV, &gauge_account),
        emission,
        "sole voted pool receives the full emission"
    );

    // =========================================================
    // The sole staker claims the full stream after the period
    // =========================================================
    let earned = exchange.gauge_earned(pool, &USER_1, WEEK).expect("earned");
    assert!(emission - earned <= 1, "earned {earned} of {emission}");

    let before = exchange
        .ledger()
        .balance_of(&veld_integration_tests::GOV, &USER_1);
    let paid = exchange.gauge_reward(pool, &USER_1, WEEK).expect("claim");
    assert_eq!(paid, earned);
    assert_eq!(
        exchange
            .ledger()
            .balance_of(&veld_integration_tests::GOV, &USER_1)
            - before,
        paid
    );
}

#[test]
fn bribe_deposit_and_claim_after_epoch_close() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");

    let position = exchange
        .create_lock(&USER_1, tokens(50), MAX_LOCK_DURATION_SECS, 0)
        .expect("create lock");
    let power = exchange.voting_power(position, 0).expect("power");
    exchange
        .vote(position, &USER_1, &[pool], &[power * 99 / 100], 0)
        .expect("vote");

    // User 2 bribes the pool's current epoch with 25 tokens.
    let reward = tokens(25);
    exchange
        .notify_bribe_reward(pool, 0, reward, &USER_2, 0)
        .expect("bribe");

    // Claiming inside the epoch fails.
    assert!(matches!(
        exchange.claim_bribe(pool, 0, position, &USER_1, WEEK - 1),
        Err(ExchangeError::Voter(VoterError::Bribe(
            BribeError::EpochNotEnded { .. }
        )))
    ));

    // After the epoch closes the sole voter takes the whole bucket.
    let before = exchange
        .ledger()
        .balance_of(&veld_integration_tests::GOV, &USER_1);
    let paid = exchange
        .claim_bribe(pool, 0, position, &USER_1, WEEK)
        .expect("claim");
    assert_eq!(paid, reward);
    assert_eq!(
        exchange
            .ledger()
            .balance_of(&veld_integration_tests::GOV, &USER_1)
            - before,
        reward
    );

    // One claim per position per epoch.
    assert!(matches!(
        exchange.claim_bribe(pool, 0, position, &USER_1, WEEK),
        Err(ExchangeError::Voter(VoterError::Bribe(
            BribeError::AlreadyClaimed { .. }
        )))
    ));
}

#[test]
fn two_voters_split_bribe_pro_rata() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");

    let p1 = exchange
        .create_lock(&USER_1, tokens(300), MAX_LOCK_DURATION_SECS, 0)
        .expect("lock 1");
    let p2 = exchange
        .create_lock(&USER_2, tokens(100), MAX_LOCK_DURATION_SECS, 0)
        .expect("lock 2");
    let w1 = exchange.voting_power(p1, 0).expect("power 1");
    let w2 = exchange.voting_power(p2, 0).expect("power 2");
    exchange.vote(p1, &USER_1, &[pool], &[w1], 0).expect("vote 1");
    exchange.vote(p2, &USER_2, &[pool], &[w2], 0).expect("vote 2");

    exchange
        .notify_bribe_reward(pool, 0, tokens(100), &USER_1, 0)
        .expect("bribe");

    let paid_1 = exchange
        .claim_bribe(pool, 0, p1, &USER_1, WEEK)
        .expect("claim 1");
    let paid_2 = exchange
        .claim_bribe(pool, 0, p2, &USER_2, WEEK)
        .expect("claim 2");
    // 3:1 voting power split.
    assert_eq!(paid_1, tokens(75));
    assert_eq!(paid_2, tokens(25));
}

#[test]
fn lock_time_validation() {
    let mut exchange = deploy(1_000_000);
    assert!(matches!(
        exchange.create_lock(&USER_1, tokens(10), 999_999, 1_000_000),
        Err(ExchangeError::Escrow(EscrowError::UnlockInPast { .. }))
    ));
    assert!(matches!(
        exchange.create_lock(
            &USER_1,
            tokens(10),
            1_000_000 + MAX_LOCK_DURATION_SECS + WEEK,
            1_000_000
        ),
        Err(ExchangeError::Escrow(EscrowError::ExceedsMaxLock { .. }))
    ));
}

#[test]
fn vote_exceeding_power_rejected() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    let position = exchange
        .create_lock(&USER_1, tokens(10), MAX_LOCK_DURATION_SECS, 0)
        .expect("lock");
    let power = exchange.voting_power(position, 0).expect("power");

    assert!(matches!(
        exchange.vote(position, &USER_1, &[pool], &[power + 1], 0),
        Err(ExchangeError::Voter(VoterError::ExceedsPower { .. }))
    ));
}

#[test]
fn duplicate_epoch_distribution_rejected() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");
    let position = exchange
        .create_lock(&USER_1, tokens(100), MAX_LOCK_DURATION_SECS, 0)
        .expect("lock");
    let power = exchange.voting_power(position, 0).expect("power");
    exchange
        .vote(position, &USER_1, &[pool], &[power], 0)
        .expect("vote");

    let voter_account = exchange.voter().account();
    exchange
        .ledger_mut()
        .mint(&veld_integration_tests::GOV, &voter_account, tokens(150))
        .expect("fund voter");
    exchange
        .distribute_all(tokens(100), &KEEPER, 0)
        .expect("first distribution");
    assert!(matches!(
        exchange.distribute_all(tokens(50), &KEEPER, 0),
        Err(ExchangeError::Voter(VoterError::AlreadyDistributed { .. }))
    ));
}

#[test]
fn merged_position_votes_with_combined_power() {
    let mut exchange = deploy(0);
    let pool = exchange
        .create_pool(&TOKEN_A, &TOKEN_B, false)
        .expect("create pool");

    let short = exchange
        .create_lock(&USER_1, tokens(40), WEEK * 52, 0)
        .expect("short lock");
    let long = exchange
        .create_lock(&USER_1, tokens(60), MAX_LOCK_DURATION_SECS, 0)
        .expect("long lock");
    exchange.merge_locks(short, long, &USER_1).expect("merge");

    // Combined amount at the max unlock time.
    let power = exchange.voting_power(long, 0).expect("power");
    assert_eq!(power, tokens(100));

    exchange
        .vote(long, &USER_1, &[pool], &[power], 0)
        .expect("vote with merged power");
    assert_eq!(exchange.voter().pool_weight(pool), power);
}

#[test]
fn expired_lock_has_no_power_and_withdraws() {
    let mut exchange = deploy(0);
    let position = exchange
        .create_lock(&USER_1, tokens(100), WEEK * 4, 0)
        .expect("lock");

    assert!(exchange.voting_power(position, 0).expect("power") > 0);
    assert_eq!(
        exchange.voting_power(position, WEEK * 4).expect("power"),
        0
    );

    assert!(matches!(
        exchange.withdraw_lock(position, &USER_1, WEEK * 4 - 1),
        Err(ExchangeError::Escrow(EscrowError::NotExpired { .. }))
    ));
    let amount = exchange
        .withdraw_lock(position, &USER_1, WEEK * 4)
        .expect("withdraw");
    assert_eq!(amount, tokens(100));
}
