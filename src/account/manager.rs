//! Account ledger facade
//!
//! `AccountManager` is the only writer of the per-account tables. Every
//! operation loads the records it needs from the store, works on local
//! copies, and writes them back only once every precondition has passed.

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::capacity::CapacityThrottle;
use super::model::{AccountBank, AccountInfo, AccountMeta, AccountSnapshot, FollowerList, FollowingList, PendingStakeQueue, Reward};
use super::store::AccountStorage;
use super::types::{AccountKey, Address, Coin, Ratio, Timestamp};
use super::vesting::StakeVesting;
use crate::config::LedgerConfig;
use crate::crypto::{address_from_public_key, public_key_hex};
use crate::error::{LedgerError, LedgerResult};
use crate::storage::KvStore;

/// Destination of a transfer. A registered username wins; the address is
/// used when no username is given or the username is not registered.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Receiver {
    #[serde(default)]
    pub username: Option<AccountKey>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Receiver {
    pub fn account(username: AccountKey) -> Self {
        Self {
            username: Some(username),
            address: None,
        }
    }

    pub fn address(address: Address) -> Self {
        Self {
            username: None,
            address: Some(address),
        }
    }

    /// Username first, falling back to `address`.
    pub fn account_or_address(username: AccountKey, address: Address) -> Self {
        Self {
            username: Some(username),
            address: Some(address),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.address.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct AccountManager {
    config: LedgerConfig,
    storage: AccountStorage,
    vesting: StakeVesting,
    throttle: CapacityThrottle,
}

impl AccountManager {
    /// Validates `config` and builds the ledger components from it.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            vesting: StakeVesting::new(config.vesting_window_secs),
            throttle: CapacityThrottle::new(config.capacity_recover_period_secs, config.decimal_scale),
            storage: AccountStorage::new(),
            config,
        })
    }

    /// Economic parameters this manager was built with.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Whether `account` has been registered.
    pub fn account_exists<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<bool> {
        Ok(self.storage.get_info(store, account)?.is_some())
    }

    // --- Coin movement ---

    /// Deposits `amount` to `address`, creating its bank and pending stake
    /// records on first use.
    pub fn deposit<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        address: &Address,
        amount: Coin,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let mut bank = self
            .storage
            .get_bank(store, address)?
            .unwrap_or_else(|| AccountBank::new(address.clone()));
        let mut queue = self
            .storage
            .get_pending_stake_queue(store, address)?
            .unwrap_or_else(|| PendingStakeQueue::new(now));

        self.vesting.add_coin(&mut bank, &mut queue, amount, now)?;

        self.storage.set_bank(store, &bank)?;
        self.storage.set_pending_stake_queue(store, address, &queue)?;
        Ok(())
    }

    /// Deposits `amount` to the bank registered by `account`.
    pub fn deposit_to_account<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        account: &AccountKey,
        amount: Coin,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let address = self.storage.address_of(store, "deposit to account", account)?;
        self.deposit(store, &address, amount, now)
    }

    /// Withdraws `amount` from the bank at `address`, newest deposits first.
    pub fn withdraw_from_address<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        address: &Address,
        amount: Coin,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let (mut bank, mut queue) = self.load_vesting(store, "withdraw", address)?;

        self.vesting.minus_coin(&mut bank, &mut queue, amount, now)?;

        self.storage.set_bank(store, &bank)?;
        self.storage.set_pending_stake_queue(store, address, &queue)?;
        Ok(())
    }

    /// Withdraws `amount` from the bank registered by `account`.
    pub fn withdraw<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        account: &AccountKey,
        amount: Coin,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let address = self.storage.address_of(store, "withdraw", account)?;
        self.withdraw_from_address(store, &address, amount, now)
    }

    /// Moves `amount` out of the sender's bank and deposits it at the
    /// receiver. The received coin starts vesting from `now`.
    pub fn transfer<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        sender: &AccountKey,
        receiver: &Receiver,
        amount: Coin,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let from = self.storage.address_of(store, "transfer", sender)?;
        let to = self.resolve_receiver(store, sender, receiver)?;

        self.withdraw_from_address(store, &from, amount, now)?;
        self.deposit(store, &to, amount, now)?;
        debug!(%sender, %from, %to, amount = %self.display(amount), "transfer");
        Ok(())
    }

    fn resolve_receiver<S: KvStore + ?Sized>(
        &self,
        store: &S,
        sender: &AccountKey,
        receiver: &Receiver,
    ) -> LedgerResult<Address> {
        if let Some(username) = &receiver.username {
            if let Some(info) = self.storage.get_info(store, username)? {
                return Ok(info.address);
            }
        }
        receiver.address.clone().ok_or_else(|| LedgerError::UnknownReceiver {
            sender: sender.clone(),
            receiver: receiver.username.as_ref().map(ToString::to_string).unwrap_or_default(),
        })
    }

    /// Retires matured deposits of `address` into its stake.
    pub fn advance_stake<S: KvStore + ?Sized>(&self, store: &mut S, address: &Address, now: Timestamp) -> LedgerResult<()> {
        let (mut bank, mut queue) = self.load_vesting(store, "advance stake", address)?;
        self.vesting.advance_to(&mut bank, &mut queue, now)?;
        self.storage.set_bank(store, &bank)?;
        self.storage.set_pending_stake_queue(store, address, &queue)?;
        Ok(())
    }

    // --- Stake and capacity ---

    /// Stake of `address` at `now`. An address that never received coin has
    /// no stake.
    pub fn get_stake_by_address<S: KvStore + ?Sized>(&self, store: &S, address: &Address, now: Timestamp) -> LedgerResult<Coin> {
        let Some(bank) = self.storage.get_bank(store, address)? else {
            return Ok(Coin::zero());
        };
        match self.storage.get_pending_stake_queue(store, address)? {
            Some(queue) => self.vesting.stake_at(&bank, &queue, now),
            None => Ok(bank.stake),
        }
    }

    /// Stake of the bank registered by `account` at `now`.
    pub fn get_stake<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey, now: Timestamp) -> LedgerResult<Coin> {
        let address = self.storage.address_of(store, "get stake", account)?;
        self.get_stake_by_address(store, &address, now)
    }

    /// Charges one operation of weight `ratio` against the account's
    /// capacity. The meta record is written whether or not the charge
    /// succeeds, so the caller must keep the writes of a
    /// `CapacityNotEnough` rejection.
    pub fn check_capacity<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        account: &AccountKey,
        ratio: Ratio,
        now: Timestamp,
    ) -> LedgerResult<Coin> {
        let mut meta = self.storage.require_meta(store, "check capacity", account)?;
        let ceiling = self.get_stake(store, account, now)?;

        let result = self.throttle.check(account, &mut meta, ceiling, ratio, now);
        self.storage.set_meta(store, account, &meta)?;
        result
    }

    /// Bumps the transaction sequence of `account`, returning the new value.
    pub fn increase_sequence<S: KvStore + ?Sized>(&self, store: &mut S, account: &AccountKey) -> LedgerResult<u64> {
        let mut meta = self.storage.require_meta(store, "increase sequence", account)?;
        meta.sequence = meta
            .sequence
            .checked_add(1)
            .ok_or(LedgerError::Overflow { op: "increase sequence" })?;
        self.storage.set_meta(store, account, &meta)?;
        Ok(meta.sequence)
    }

    // --- Rewards ---

    /// Credits `income` to the lifetime total and `reward` to the claimable
    /// balance of `account`.
    pub fn accrue_reward<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        account: &AccountKey,
        income: Coin,
        reward: Coin,
    ) -> LedgerResult<()> {
        let mut record = self.storage.require_reward(store, "accrue reward", account)?;
        record.accrue(income, reward)?;
        self.storage.set_reward(store, account, &record)?;
        debug!(
            %account,
            income = %self.display(income),
            reward = %self.display(reward),
            unclaimed = %self.display(record.unclaimed_reward),
            "reward accrued"
        );
        Ok(())
    }

    /// Credits friction income to `account`. Friction income is never
    /// claimable.
    pub fn accrue_friction_income<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        account: &AccountKey,
        amount: Coin,
    ) -> LedgerResult<()> {
        let mut record = self.storage.require_reward(store, "accrue friction income", account)?;
        record.accrue_friction(amount)?;
        self.storage.set_reward(store, account, &record)?;
        Ok(())
    }

    /// Moves the whole unclaimed reward into the account's bank as a fresh
    /// deposit. Claiming with nothing unclaimed succeeds and returns zero.
    pub fn claim_reward<S: KvStore + ?Sized>(&self, store: &mut S, account: &AccountKey, now: Timestamp) -> LedgerResult<Coin> {
        let mut record = self.storage.require_reward(store, "claim reward", account)?;
        let address = self.storage.address_of(store, "claim reward", account)?;

        let claimed = record.take_unclaimed();
        if claimed.is_zero() {
            debug!(%account, "nothing to claim");
            return Ok(claimed);
        }

        self.deposit(store, &address, claimed, now)?;
        self.storage.set_reward(store, account, &record)?;
        debug!(%account, claimed = %self.display(claimed), "reward claimed");
        Ok(claimed)
    }

    // --- Social graph ---

    /// Adds `follower` to the follower list of `followee` and `followee` to
    /// the following list of `follower`. Following twice is a no-op.
    pub fn follow<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        follower: &AccountKey,
        followee: &AccountKey,
    ) -> LedgerResult<()> {
        self.storage.require_info(store, "follow", follower)?;
        self.storage.require_info(store, "follow", followee)?;
        let mut followers = self.storage.get_follower(store, followee)?;
        let mut following = self.storage.get_following(store, follower)?;

        if followers.insert(follower) {
            self.storage.set_follower(store, followee, &followers)?;
        }
        if following.insert(followee) {
            self.storage.set_following(store, follower, &following)?;
        }
        debug!(%follower, %followee, "follow");
        Ok(())
    }

    /// Reverses [`AccountManager::follow`]. Unfollowing someone not
    /// followed is a no-op.
    pub fn unfollow<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        follower: &AccountKey,
        followee: &AccountKey,
    ) -> LedgerResult<()> {
        self.storage.require_info(store, "unfollow", follower)?;
        self.storage.require_info(store, "unfollow", followee)?;
        let mut followers = self.storage.get_follower(store, followee)?;
        let mut following = self.storage.get_following(store, follower)?;

        if followers.remove(follower) {
            self.storage.set_follower(store, followee, &followers)?;
        }
        if following.remove(followee) {
            self.storage.set_following(store, follower, &following)?;
        }
        debug!(%follower, %followee, "unfollow");
        Ok(())
    }

    /// Usernames following `account`; empty if none.
    pub fn get_follower<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<FollowerList> {
        self.storage.get_follower(store, account)
    }

    /// Usernames `account` follows; empty if none.
    pub fn get_following<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<FollowingList> {
        self.storage.get_following(store, account)
    }

    // --- Registration ---

    /// Registers `account` to the bank addressed by `public_key`. The bank
    /// must already hold at least the register fee and must not be linked
    /// to another username.
    pub fn create_account<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        account: &AccountKey,
        public_key: &VerifyingKey,
        now: Timestamp,
    ) -> LedgerResult<Address> {
        if self.account_exists(store, account)? {
            return Err(LedgerError::AccountAlreadyExists(account.clone()));
        }
        let address = address_from_public_key(public_key);
        let mut bank = self
            .storage
            .get_bank(store, &address)?
            .ok_or_else(|| LedgerError::BankNotFound(address.clone()))?;
        if let Some(username) = &bank.username {
            return Err(LedgerError::BankAlreadyRegistered {
                address,
                username: username.clone(),
            });
        }
        if bank.balance < self.config.register_fee {
            return Err(LedgerError::InsufficientRegisterFee {
                address,
                required: self.config.register_fee,
                available: bank.balance,
            });
        }

        bank.username = Some(account.clone());
        let info = AccountInfo {
            username: account.clone(),
            created_at: now,
            address: address.clone(),
            public_key: public_key_hex(public_key),
        };
        let meta = AccountMeta {
            last_activity_time: now,
            ..Default::default()
        };

        self.storage.set_bank(store, &bank)?;
        self.storage.set_info(store, &info)?;
        self.storage.set_meta(store, account, &meta)?;
        self.storage.set_reward(store, account, &Reward::default())?;

        info!(%account, %address, "account created");
        Ok(address)
    }

    // --- Read accessors ---

    /// Bank at `address`; missing is an error.
    pub fn get_bank<S: KvStore + ?Sized>(&self, store: &S, address: &Address) -> LedgerResult<AccountBank> {
        self.storage.require_bank(store, "get bank", address)
    }

    /// Pending deposits of `address`; missing is an error.
    pub fn get_pending_stake_queue<S: KvStore + ?Sized>(&self, store: &S, address: &Address) -> LedgerResult<PendingStakeQueue> {
        self.storage
            .get_pending_stake_queue(store, address)?
            .ok_or_else(|| LedgerError::not_found("get pending stake queue", "pending stake queue", address))
    }

    /// Meta record of a registered `account`.
    pub fn get_meta<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<AccountMeta> {
        self.storage.require_meta(store, "get meta", account)
    }

    /// Reward record of a registered `account`.
    pub fn get_reward<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<Reward> {
        self.storage.require_reward(store, "get reward", account)
    }

    /// Registration record of `account`.
    pub fn get_info<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<AccountInfo> {
        self.storage.require_info(store, "get info", account)
    }

    /// Every record of `account`, read at once.
    pub fn snapshot<S: KvStore + ?Sized>(&self, store: &S, account: &AccountKey) -> LedgerResult<AccountSnapshot> {
        let info = self.get_info(store, account)?;
        let bank = self.get_bank(store, &info.address)?;
        let pending_stake_queue = self.get_pending_stake_queue(store, &info.address)?;
        Ok(AccountSnapshot {
            bank,
            pending_stake_queue,
            meta: self.get_meta(store, account)?,
            reward: self.get_reward(store, account)?,
            info,
        })
    }

    /// Whole-coin form of `amount` for log output.
    fn display(&self, amount: Coin) -> rust_decimal::Decimal {
        amount.to_decimal(self.config.decimal_scale)
    }

    fn load_vesting<S: KvStore + ?Sized>(
        &self,
        store: &S,
        op: &'static str,
        address: &Address,
    ) -> LedgerResult<(AccountBank, PendingStakeQueue)> {
        let bank = self.storage.require_bank(store, op, address)?;
        let queue = self
            .storage
            .get_pending_stake_queue(store, address)?
            .ok_or_else(|| LedgerError::not_found(op, "pending stake queue", address))?;
        Ok((bank, queue))
    }
}
