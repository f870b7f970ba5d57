pub mod account;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod genesis;
pub mod handler;
pub mod msg;
pub mod storage;

pub use account::{AccountKey, AccountManager, Address, Coin, Ratio, Receiver, Timestamp};
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use genesis::{GenesisAccount, GenesisState};
pub use handler::LedgerApp;
pub use msg::{LedgerMsg, MsgOutcome};
pub use storage::{CacheStore, KvStore, MemoryStore, SledStore, StoreError};
