#![allow(dead_code)]

use coinday_ledger::{AccountKey, Address, Coin, LedgerApp, LedgerConfig, LedgerMsg, MemoryStore, Timestamp};
use ed25519_dalek::{SigningKey, VerifyingKey};
use tracing_subscriber::EnvFilter;

pub const T0: Timestamp = 1_500_000_000;

/// Routes library logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn verifying_key(seed: u8) -> VerifyingKey {
    SigningKey::from_bytes(&[seed; 32]).verifying_key()
}

pub fn address(seed: u8) -> Address {
    coinday_ledger::crypto::address_from_public_key(&verifying_key(seed))
}

pub fn user(name: &str) -> AccountKey {
    AccountKey::new(name).unwrap()
}

pub fn coin(whole: u64) -> Coin {
    Coin::from_whole(whole, LedgerConfig::default().decimal_scale).unwrap()
}

pub fn default_app() -> LedgerApp<MemoryStore> {
    LedgerApp::new(MemoryStore::new(), LedgerConfig::default()).unwrap()
}

/// Funds the bank of key `seed` with `amount` and registers `name` to it.
pub fn register<S: coinday_ledger::KvStore>(app: &mut LedgerApp<S>, name: &str, seed: u8, amount: Coin, now: Timestamp) {
    app.deliver(LedgerMsg::Deposit { address: address(seed), amount }, now).unwrap();
    app.deliver(
        LedgerMsg::CreateAccount {
            username: user(name),
            public_key: coinday_ledger::crypto::public_key_hex(&verifying_key(seed)),
        },
        now,
    )
    .unwrap();
}
