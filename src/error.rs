use thiserror::Error;

use crate::account::types::{AccountKey, Address, Coin};
use crate::storage::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{op}: invalid coin amount {amount}")]
    InvalidAmount { op: &'static str, amount: Coin },
    #[error("{op}: insufficient balance at {address}: requested {requested}, available {available}")]
    InsufficientBalance {
        op: &'static str,
        address: Address,
        requested: Coin,
        available: Coin,
    },
    #[error("account {0} already exists")]
    AccountAlreadyExists(AccountKey),
    #[error("bank {address} already registered to {username}")]
    BankAlreadyRegistered { address: Address, username: AccountKey },
    #[error("account bank {0} doesn't exist")]
    BankNotFound(Address),
    #[error("register fee insufficient at {address}: required {required}, available {available}")]
    InsufficientRegisterFee {
        address: Address,
        required: Coin,
        available: Coin,
    },
    #[error("account {account} transaction capacity not enough: cost {cost}, available {available}")]
    CapacityNotEnough {
        account: AccountKey,
        cost: Coin,
        available: Coin,
    },
    #[error("{op}: {record} record not found for {key}")]
    RecordNotFound {
        op: &'static str,
        record: &'static str,
        key: String,
    },
    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreError),
    #[error("invalid username {username:?}: {reason}")]
    InvalidUsername { username: String, reason: &'static str },
    #[error("{op}: block time {now} precedes last update {last} for {address}")]
    InvalidTimestamp {
        op: &'static str,
        address: Address,
        last: i64,
        now: i64,
    },
    #[error("{op}: fixed-point overflow")]
    Overflow { op: &'static str },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("transfer from {sender}: unknown receiver {receiver:?} and no fallback address")]
    UnknownReceiver { sender: AccountKey, receiver: String },
}

impl LedgerError {
    /// Data-layer failures abort block processing; everything else is a
    /// per-transaction rejection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::StoreFailure(_))
    }

    /// A rejected capacity check still records the recovered capacity.
    pub fn keeps_writes(&self) -> bool {
        matches!(self, LedgerError::CapacityNotEnough { .. })
    }

    pub(crate) fn not_found(op: &'static str, record: &'static str, key: impl ToString) -> Self {
        LedgerError::RecordNotFound {
            op,
            record,
            key: key.to_string(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
