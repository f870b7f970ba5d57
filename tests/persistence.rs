mod common;

use coinday_ledger::crypto::public_key_hex;
use coinday_ledger::{Coin, GenesisState, LedgerApp, LedgerConfig, LedgerMsg, SledStore};

use common::*;

const W: i64 = 7 * 24 * 3600;

fn genesis_json() -> String {
    format!(
        r#"{{
            "genesis_time": {},
            "accounts": [
                {{ "username": "lino", "public_key": "{}", "coin": "1000" }},
                {{ "username": "validator1", "public_key": "{}", "coin": "2.5" }}
            ]
        }}"#,
        T0,
        public_key_hex(&verifying_key(1)),
        public_key_hex(&verifying_key(2)),
    )
}

#[test]
fn genesis_funds_and_registers_accounts() {
    init_tracing();
    let genesis = GenesisState::from_json(&genesis_json()).unwrap();
    let mut app = default_app();
    app.init_genesis(&genesis).unwrap();

    let lino = app.manager().get_info(app.store(), &user("lino")).unwrap();
    assert_eq!(lino.address, address(1));
    assert_eq!(lino.created_at, T0);
    assert_eq!(app.manager().get_bank(app.store(), &address(2)).unwrap().balance, Coin::new(250_000));
    assert_eq!(app.get_stake(&user("lino"), T0 + W).unwrap(), coin(1000));
}

#[test]
fn genesis_with_unfunded_account_fails() {
    init_tracing();
    let json = format!(
        r#"{{ "genesis_time": 0, "accounts": [ {{ "username": "tiny", "public_key": "{}", "coin": "0.5" }} ] }}"#,
        public_key_hex(&verifying_key(3)),
    );
    let genesis = GenesisState::from_json(&json).unwrap();
    let mut app = default_app();
    assert!(app.init_genesis(&genesis).is_err());
    assert!(!app.manager().account_exists(app.store(), &user("tiny")).unwrap());
}

#[test]
fn genesis_is_all_or_nothing() {
    init_tracing();
    let json = format!(
        r#"{{ "genesis_time": 0, "accounts": [
            {{ "username": "rich", "public_key": "{}", "coin": "5" }},
            {{ "username": "tiny", "public_key": "{}", "coin": "0.5" }}
        ] }}"#,
        public_key_hex(&verifying_key(4)),
        public_key_hex(&verifying_key(3)),
    );
    let genesis = GenesisState::from_json(&json).unwrap();
    let mut app = default_app();
    assert!(app.init_genesis(&genesis).is_err());
    assert!(!app.manager().account_exists(app.store(), &user("rich")).unwrap());
    assert!(app.store().is_empty());
}

#[test]
fn sled_backed_ledger_survives_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let digest = {
        let store = SledStore::open(dir.path()).unwrap();
        let mut app = LedgerApp::new(store, LedgerConfig::default()).unwrap();
        register(&mut app, "alice", 1, coin(10), T0);
        app.deliver(LedgerMsg::IncreaseSequence { username: user("alice") }, T0 + 1).unwrap();
        app.commit().unwrap();
        app.account_digest(&user("alice")).unwrap()
    };

    let store = SledStore::open(dir.path()).unwrap();
    let app = LedgerApp::new(store, LedgerConfig::default()).unwrap();
    assert_eq!(app.account_digest(&user("alice")).unwrap(), digest);
    assert_eq!(app.manager().get_meta(app.store(), &user("alice")).unwrap().sequence, 1);
    assert_eq!(app.get_stake(&user("alice"), T0 + W / 2).unwrap(), coin(5));
}
