mod common;

use coinday_ledger::{Coin, LedgerConfig, LedgerError, LedgerMsg, MsgOutcome, Ratio, Receiver};

use common::*;

const W: i64 = 7 * 24 * 3600;
const P: i64 = 7 * 24 * 3600;

#[test]
fn single_deposit_vesting() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, coin(100), T0);

    assert_eq!(app.get_stake(&user("alice"), T0).unwrap(), Coin::zero());
    assert_eq!(app.get_stake(&user("alice"), T0 + W / 2).unwrap(), coin(50));
    assert_eq!(app.get_stake(&user("alice"), T0 + W + 1).unwrap(), coin(100));

    // any mutation at T0 + W + 1 retires the entry
    app.deliver(LedgerMsg::Deposit { address: address(1), amount: Coin::new(1) }, T0 + W + 1)
        .unwrap();
    let bank = app.manager().get_bank(app.store(), &address(1)).unwrap();
    assert_eq!(bank.stake, coin(100));
    let queue = app.manager().get_pending_stake_queue(app.store(), &address(1)).unwrap();
    assert_eq!(queue.pending_stake_list.len(), 1);
    assert_eq!(queue.pending_stake_list[0].start_time, T0 + W + 1);
}

#[test]
fn withdrawal_removes_newest_deposit() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, coin(100), T0);
    app.deliver(LedgerMsg::Deposit { address: address(1), amount: coin(100) }, T0 + 1).unwrap();
    app.deliver(LedgerMsg::Withdraw { username: user("alice"), amount: coin(100) }, T0 + 2)
        .unwrap();

    let queue = app.manager().get_pending_stake_queue(app.store(), &address(1)).unwrap();
    assert_eq!(queue.pending_stake_list.len(), 1);
    assert_eq!(queue.pending_stake_list[0].start_time, T0);
    assert_eq!(queue.pending_stake_list[0].coin, coin(100));
    assert_eq!(app.get_stake(&user("alice"), T0 + W + 1).unwrap(), coin(100));
}

#[test]
fn withdrawal_beyond_balance_is_rejected() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, coin(10), T0);

    let err = app
        .deliver(LedgerMsg::Withdraw { username: user("alice"), amount: coin(11) }, T0 + 1)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert!(!err.is_fatal());
    assert_eq!(app.manager().get_bank(app.store(), &address(1)).unwrap().balance, coin(10));
}

#[test]
fn capacity_recovers_to_ceiling() {
    init_tracing();
    let mut app = default_app();
    // 1,000,000 base units of stake once vested
    register(&mut app, "alice", 1, Coin::new(1_000_000), T0);

    let outcome = app
        .deliver(
            LedgerMsg::CheckCapacity { username: user("alice"), ratio: Ratio::new(1, 10).unwrap() },
            T0 + P,
        )
        .unwrap();
    let cost = Ratio::new(1, 10).unwrap().mul_floor(LedgerConfig::default().decimal_scale).unwrap();
    assert_eq!(outcome, MsgOutcome::CapacityRemaining(Coin::new(1_000_000 - cost.units())));
    assert_eq!(outcome, MsgOutcome::CapacityRemaining(Coin::new(990_000)));

    let meta = app.manager().get_meta(app.store(), &user("alice")).unwrap();
    assert_eq!(meta.transaction_capacity, Coin::new(990_000));
    assert_eq!(meta.last_activity_time, T0 + P);
}

#[test]
fn capacity_rejection_preserves_clock() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, Coin::new(1_000_000), T0);
    let expensive = Ratio::new(10, 1).unwrap(); // costs the whole deposit

    // a quarter vested, a quarter recovered
    let err = app
        .deliver(LedgerMsg::CheckCapacity { username: user("alice"), ratio: expensive }, T0 + P / 4)
        .unwrap_err();
    assert!(matches!(err, LedgerError::CapacityNotEnough { .. }));
    let meta = app.manager().get_meta(app.store(), &user("alice")).unwrap();
    assert_eq!(meta.last_activity_time, T0);
    assert_eq!(meta.transaction_capacity, Coin::new(62_500));
    let first = meta.transaction_capacity;

    // the clock never moved, so capacity keeps creeping up
    let err = app
        .deliver(LedgerMsg::CheckCapacity { username: user("alice"), ratio: expensive }, T0 + P / 8 * 3)
        .unwrap_err();
    assert!(matches!(err, LedgerError::CapacityNotEnough { .. }));
    let meta = app.manager().get_meta(app.store(), &user("alice")).unwrap();
    assert_eq!(meta.last_activity_time, T0);
    assert!(meta.transaction_capacity > first);
    assert_eq!(meta.transaction_capacity, Coin::new(62_500 + 140_625));
}

#[test]
fn reward_round_trip() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, coin(1), T0);
    let alice = user("alice");

    app.deliver(LedgerMsg::AccrueReward { username: alice.clone(), income: Coin::new(200), reward: Coin::new(300) }, T0)
        .unwrap();
    app.deliver(LedgerMsg::AccrueReward { username: alice.clone(), income: Coin::new(300), reward: Coin::new(200) }, T0)
        .unwrap();
    let before = app.manager().get_reward(app.store(), &alice).unwrap();
    let balance_before = app.manager().get_bank(app.store(), &address(1)).unwrap().balance;

    let outcome = app.deliver(LedgerMsg::ClaimReward { username: alice.clone() }, T0 + 10).unwrap();
    assert_eq!(outcome, MsgOutcome::Claimed(before.unclaimed_reward));

    let after = app.manager().get_reward(app.store(), &alice).unwrap();
    assert_eq!(after.unclaimed_reward, Coin::zero());
    assert_eq!(after.total_income, before.total_income);
    assert_eq!(after.total_income, Coin::new(500));
    let balance_after = app.manager().get_bank(app.store(), &address(1)).unwrap().balance;
    assert_eq!(balance_after, balance_before.plus(before.unclaimed_reward, "test").unwrap());
}

#[test]
fn create_account_error_order() {
    init_tracing();
    let mut app = default_app();
    let create = |name: &str, seed: u8| LedgerMsg::CreateAccount {
        username: user(name),
        public_key: coinday_ledger::crypto::public_key_hex(&verifying_key(seed)),
    };

    assert!(matches!(app.deliver(create("bob", 2), T0), Err(LedgerError::BankNotFound(_))));

    app.deliver(LedgerMsg::Deposit { address: address(2), amount: Coin::new(1) }, T0).unwrap();
    assert!(matches!(
        app.deliver(create("bob", 2), T0),
        Err(LedgerError::InsufficientRegisterFee { .. })
    ));

    app.deliver(LedgerMsg::Deposit { address: address(2), amount: coin(1) }, T0).unwrap();
    app.deliver(create("bob", 2), T0).unwrap();

    assert!(matches!(app.deliver(create("bob", 3), T0), Err(LedgerError::AccountAlreadyExists(_))));
    assert!(matches!(
        app.deliver(create("carol", 2), T0),
        Err(LedgerError::BankAlreadyRegistered { .. })
    ));
}

#[test]
fn transfer_to_account_and_address() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, coin(10), T0);
    register(&mut app, "bob", 2, coin(1), T0);

    app.deliver(
        LedgerMsg::Transfer {
            sender: user("alice"),
            receiver: Receiver::account(user("bob")),
            amount: coin(4),
            memo: "lunch".to_string(),
        },
        T0 + 1,
    )
    .unwrap();
    app.deliver(
        LedgerMsg::Transfer {
            sender: user("bob"),
            receiver: Receiver::address(address(9)),
            amount: coin(2),
            memo: String::new(),
        },
        T0 + 2,
    )
    .unwrap();

    let balance = |seed| app.manager().get_bank(app.store(), &address(seed)).unwrap().balance;
    assert_eq!(balance(1), coin(6));
    assert_eq!(balance(2), coin(3));
    assert_eq!(balance(9), coin(2));

    // received coin vests from the transfer time
    assert_eq!(app.get_stake_by_address(&address(9), T0 + 2 + W / 2).unwrap(), coin(1));
}

#[test]
fn transfer_falls_back_to_address_for_unregistered_name() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, coin(10), T0);

    let to_ghost = |receiver: Receiver| LedgerMsg::Transfer {
        sender: user("alice"),
        receiver,
        amount: coin(3),
        memo: String::new(),
    };
    app.deliver(to_ghost(Receiver::account_or_address(user("ghost"), address(8))), T0 + 1)
        .unwrap();
    assert_eq!(app.manager().get_bank(app.store(), &address(8)).unwrap().balance, coin(3));

    // nowhere to send: nothing moves
    let err = app.deliver(to_ghost(Receiver::account(user("ghost"))), T0 + 2).unwrap_err();
    assert_eq!(err, LedgerError::UnknownReceiver { sender: user("alice"), receiver: "ghost".to_string() });
    assert_eq!(app.manager().get_bank(app.store(), &address(1)).unwrap().balance, coin(7));
}

#[test]
fn follow_and_unfollow_are_idempotent() {
    init_tracing();
    let mut app = default_app();
    register(&mut app, "alice", 1, coin(1), T0);
    register(&mut app, "bob", 2, coin(1), T0);
    register(&mut app, "carol", 3, coin(1), T0);

    for follower in ["alice", "carol", "alice"] {
        app.deliver(LedgerMsg::Follow { follower: user(follower), followee: user("bob") }, T0 + 1)
            .unwrap();
    }
    let followers = app.manager().get_follower(app.store(), &user("bob")).unwrap();
    assert_eq!(followers.follower, vec![user("alice"), user("carol")]);
    let following = app.manager().get_following(app.store(), &user("alice")).unwrap();
    assert_eq!(following.following, vec![user("bob")]);

    for _ in 0..2 {
        app.deliver(LedgerMsg::Unfollow { follower: user("alice"), followee: user("bob") }, T0 + 2)
            .unwrap();
    }
    let followers = app.manager().get_follower(app.store(), &user("bob")).unwrap();
    assert_eq!(followers.follower, vec![user("carol")]);
    assert!(app.manager().get_following(app.store(), &user("alice")).unwrap().following.is_empty());

    // following someone unregistered is rejected
    let err = app
        .deliver(LedgerMsg::Follow { follower: user("ghost"), followee: user("bob") }, T0 + 3)
        .unwrap_err();
    assert!(matches!(err, LedgerError::RecordNotFound { record: "info", .. }));
}

#[test]
fn unknown_account_operations() {
    init_tracing();
    let mut app = default_app();
    let err = app
        .deliver(LedgerMsg::ClaimReward { username: user("ghost") }, T0)
        .unwrap_err();
    assert!(matches!(err, LedgerError::RecordNotFound { .. }));
    assert!(app.get_stake(&user("ghost"), T0).is_err());
}
