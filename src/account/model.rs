//! Persisted per-account records

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::types::{AccountKey, Address, Coin, Timestamp};

/// Spendable balance and matured stake of one address.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBank {
    pub address: Address,
    pub balance: Coin,
    pub stake: Coin,
    pub username: Option<AccountKey>,
}

impl AccountBank {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }
}

/// A deposit that has not yet matured into stake.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStake {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub coin: Coin,
}

/// Not-yet-matured deposits of one address, oldest first.
///
/// `stake_in_queue` is the vesting progress of the queued entries as of
/// `last_update_time`, in coin-seconds: the sum over entries of
/// `coin * (last_update_time - start_time)`. Dividing by the vesting window
/// gives the partially vested stake.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingStakeQueue {
    pub last_update_time: Timestamp,
    pub total_coin: Coin,
    pub stake_in_queue: u128,
    pub pending_stake_list: VecDeque<PendingStake>,
}

impl PendingStakeQueue {
    pub fn new(now: Timestamp) -> Self {
        Self {
            last_update_time: now,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending_stake_list.is_empty()
    }
}

/// Small, frequently updated per-account fields.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountMeta {
    pub sequence: u64,
    pub last_activity_time: Timestamp,
    pub transaction_capacity: Coin,
}

/// Income credited from distribution events.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Reward {
    pub total_income: Coin,
    pub original_income: Coin,
    pub friction_income: Coin,
    pub unclaimed_reward: Coin,
}

/// Link between a username and the bank it registered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub username: AccountKey,
    pub created_at: Timestamp,
    pub address: Address,
    pub public_key: String,
}

/// Every record of one registered account, as of a single read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub info: AccountInfo,
    pub bank: AccountBank,
    pub pending_stake_queue: PendingStakeQueue,
    pub meta: AccountMeta,
    pub reward: Reward,
}

/// Usernames following an account, in follow order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowerList {
    pub follower: Vec<AccountKey>,
}

/// Usernames an account follows, in follow order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowingList {
    pub following: Vec<AccountKey>,
}
