//! Account record storage

use super::model::{AccountBank, AccountInfo, AccountMeta, FollowerList, FollowingList, PendingStakeQueue, Reward};
use super::types::{AccountKey, Address};
use crate::error::{LedgerError, LedgerResult};
use crate::storage::{self, KvStore};

pub const BANK_PREFIX: &str = "bank/";
pub const PENDING_STAKE_PREFIX: &str = "pending_stake/";
pub const META_PREFIX: &str = "meta/";
pub const REWARD_PREFIX: &str = "reward/";
pub const INFO_PREFIX: &str = "info/";
pub const FOLLOWER_PREFIX: &str = "follower/";
pub const FOLLOWING_PREFIX: &str = "following/";

pub fn bank_key(address: &Address) -> String {
    format!("{}{}", BANK_PREFIX, address)
}

pub fn pending_stake_key(address: &Address) -> String {
    format!("{}{}", PENDING_STAKE_PREFIX, address)
}

pub fn meta_key(account: &AccountKey) -> String {
    format!("{}{}", META_PREFIX, account)
}

pub fn reward_key(account: &AccountKey) -> String {
    format!("{}{}", REWARD_PREFIX, account)
}

pub fn info_key(account: &AccountKey) -> String {
    format!("{}{}", INFO_PREFIX, account)
}

pub fn follower_key(account: &AccountKey) -> String {
    format!("{}{}", FOLLOWER_PREFIX, account)
}

pub fn following_key(account: &AccountKey) -> String {
    format!("{}{}", FOLLOWING_PREFIX, account)
}

/// Typed access to the per-account tables. Holds no state of its own;
/// every record is decoded fresh from the store on each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountStorage;

impl AccountStorage {
    pub fn new() -> Self {
        AccountStorage
    }

    /// Bank record at `address`, if any coin ever reached it.
    pub fn get_bank<S: KvStore + ?Sized>(&self, store: &S, address: &Address) -> LedgerResult<Option<AccountBank>> {
        Ok(storage::get(store, &bank_key(address))?)
    }

    /// Writes `bank` under its own address.
    pub fn set_bank<S: KvStore + ?Sized>(&self, store: &mut S, bank: &AccountBank) -> LedgerResult<()> {
        Ok(storage::put(store, &bank_key(&bank.address), bank)?)
    }

    /// Pending deposits of `address`.
    pub fn get_pending_stake_queue<S: KvStore + ?Sized>(
        &self,
        store: &S,
        address: &Address,
    ) -> LedgerResult<Option<PendingStakeQueue>> {
        Ok(storage::get(store, &pending_stake_key(address))?)
    }

    /// Replaces the pending deposits of `address`.
    pub fn set_pending_stake_queue<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        address: &Address,
        queue: &PendingStakeQueue,
    ) -> LedgerResult<()> {
        Ok(storage::put(store, &pending_stake_key(address), queue)?)
    }

    /// Sequence and capacity state of `account`.
    pub fn get_meta<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<Option<AccountMeta>> {
        Ok(storage::get(store, &meta_key(account))?)
    }

    /// Writes the meta record of `account`.
    pub fn set_meta<S: KvStore + ?Sized>(&self, store: &mut S, account: &AccountKey, meta: &AccountMeta) -> LedgerResult<()> {
        Ok(storage::put(store, &meta_key(account), meta)?)
    }

    /// Reward income of `account`.
    pub fn get_reward<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<Option<Reward>> {
        Ok(storage::get(store, &reward_key(account))?)
    }

    /// Writes the reward record of `account`.
    pub fn set_reward<S: KvStore + ?Sized>(&self, store: &mut S, account: &AccountKey, reward: &Reward) -> LedgerResult<()> {
        Ok(storage::put(store, &reward_key(account), reward)?)
    }

    /// Registration record of `account`.
    pub fn get_info<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<Option<AccountInfo>> {
        Ok(storage::get(store, &info_key(account))?)
    }

    /// Writes `info` under its username.
    pub fn set_info<S: KvStore + ?Sized>(&self, store: &mut S, info: &AccountInfo) -> LedgerResult<()> {
        Ok(storage::put(store, &info_key(&info.username), info)?)
    }

    /// Followers of `account`; empty if nobody ever followed it.
    pub fn get_follower<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<FollowerList> {
        Ok(storage::get::<_, FollowerList>(store, &follower_key(account))?.unwrap_or_default())
    }

    /// Stores the followers of `account`.
    pub fn set_follower<S: KvStore + ?Sized>(&self, store: &mut S, account: &AccountKey, list: &FollowerList) -> LedgerResult<()> {
        Ok(storage::put(store, &follower_key(account), list)?)
    }

    /// Accounts `account` follows; empty if it never followed anyone.
    pub fn get_following<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<FollowingList> {
        Ok(storage::get::<_, FollowingList>(store, &following_key(account))?.unwrap_or_default())
    }

    /// Stores who `account` follows.
    pub fn set_following<S: KvStore + ?Sized>(&self, store: &mut S, account: &AccountKey, list: &FollowingList) -> LedgerResult<()> {
        Ok(storage::put(store, &following_key(account), list)?)
    }

    // --- Required lookups: absence is an error ---

    /// Bank of `address`, or `RecordNotFound` tagged with `op`.
    pub fn require_bank<S: KvStore + ?Sized>(&self, store: &S, op: &'static str, address: &Address) -> LedgerResult<AccountBank> {
        self.get_bank(store, address)?
            .ok_or_else(|| LedgerError::not_found(op, "bank", address))
    }

    pub fn require_meta<S: KvStore + ?Sized>(&self, store: &S, op: &'static str, account: &AccountKey) -> LedgerResult<AccountMeta> {
        self.get_meta(store, account)?
            .ok_or_else(|| LedgerError::not_found(op, "meta", account))
    }

    pub fn require_reward<S: KvStore + ?Sized>(&self, store: &S, op: &'static str, account: &AccountKey) -> LedgerResult<Reward> {
        self.get_reward(store, account)?
            .ok_or_else(|| LedgerError::not_found(op, "reward", account))
    }

    pub fn require_info<S: KvStore + ?Sized>(&self, store: &S, op: &'static str, account: &AccountKey) -> LedgerResult<AccountInfo> {
        self.get_info(store, account)?
            .ok_or_else(|| LedgerError::not_found(op, "info", account))
    }

    /// Resolves a username to the address of the bank it registered.
    pub fn address_of<S: KvStore + ?Sized>(&self, store: &S, op: &'static str, account: &AccountKey) -> LedgerResult<Address> {
        Ok(self.require_info(store, op, account)?.address)
    }
}
