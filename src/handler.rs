//! Message dispatch
//!
//! `LedgerApp` applies one [`LedgerMsg`] at a time against a write buffer
//! over the backing store. A message that fails leaves no trace unless its
//! error says otherwise ([`LedgerError::keeps_writes`](crate::error::LedgerError::keeps_writes)).

use tracing::{debug, info, warn};

use crate::account::{AccountKey, AccountManager, Address, Coin, Timestamp};
use crate::config::LedgerConfig;
use crate::crypto::public_key_from_hex;
use crate::error::LedgerResult;
use crate::genesis::GenesisState;
use crate::msg::{LedgerMsg, MsgOutcome};
use crate::storage::{CacheStore, KvStore};

pub struct LedgerApp<S: KvStore> {
    store: S,
    manager: AccountManager,
}

impl<S: KvStore> LedgerApp<S> {
    pub fn new(store: S, config: LedgerConfig) -> LedgerResult<Self> {
        Ok(Self {
            store,
            manager: AccountManager::new(config)?,
        })
    }

    pub fn manager(&self) -> &AccountManager {
        &self.manager
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies `msg` at `block_time`. Writes reach the backing store only if
    /// the message succeeds, or fails with an error that keeps its writes.
    pub fn deliver(&mut self, msg: LedgerMsg, block_time: Timestamp) -> LedgerResult<MsgOutcome> {
        msg.validate_basic()?;
        let name = msg.name();

        let mut cache = CacheStore::new(&mut self.store);
        let result = Self::execute(&self.manager, &mut cache, msg, block_time);

        match &result {
            Ok(outcome) => {
                debug!(msg = name, ?outcome, writes = cache.pending_writes(), "message delivered");
                cache.flush()?;
            }
            Err(e) if e.keeps_writes() => {
                debug!(msg = name, error = %e, "message rejected, keeping writes");
                cache.flush()?;
            }
            Err(e) if e.is_fatal() => {
                warn!(msg = name, error = %e, "store failure");
                cache.discard();
            }
            Err(e) => {
                debug!(msg = name, error = %e, "message rejected");
                cache.discard();
            }
        }
        result
    }

    fn execute<K: KvStore + ?Sized>(
        manager: &AccountManager,
        store: &mut K,
        msg: LedgerMsg,
        now: Timestamp,
    ) -> LedgerResult<MsgOutcome> {
        match msg {
            LedgerMsg::Deposit { address, amount } => {
                manager.deposit(store, &address, amount, now)?;
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::DepositToAccount { username, amount } => {
                manager.deposit_to_account(store, &username, amount, now)?;
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::Withdraw { username, amount } => {
                manager.withdraw(store, &username, amount, now)?;
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::Transfer { sender, receiver, amount, memo } => {
                manager.transfer(store, &sender, &receiver, amount, now)?;
                if !memo.is_empty() {
                    debug!(%sender, %memo, "transfer memo");
                }
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::Follow { follower, followee } => {
                manager.follow(store, &follower, &followee)?;
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::Unfollow { follower, followee } => {
                manager.unfollow(store, &follower, &followee)?;
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::CheckCapacity { username, ratio } => manager
                .check_capacity(store, &username, ratio, now)
                .map(MsgOutcome::CapacityRemaining),
            LedgerMsg::AccrueReward { username, income, reward } => {
                manager.accrue_reward(store, &username, income, reward)?;
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::AccrueFrictionIncome { username, amount } => {
                manager.accrue_friction_income(store, &username, amount)?;
                Ok(MsgOutcome::Done)
            }
            LedgerMsg::ClaimReward { username } => manager.claim_reward(store, &username, now).map(MsgOutcome::Claimed),
            LedgerMsg::CreateAccount { username, public_key } => {
                let public_key = public_key_from_hex(&public_key)?;
                manager
                    .create_account(store, &username, &public_key, now)
                    .map(MsgOutcome::AccountCreated)
            }
            LedgerMsg::IncreaseSequence { username } => manager.increase_sequence(store, &username).map(MsgOutcome::Sequence),
        }
    }

    /// Flushes the backing store at the end of a block.
    pub fn commit(&mut self) -> LedgerResult<()> {
        self.store.flush()?;
        info!("ledger committed");
        Ok(())
    }

    /// Funds and registers every genesis account, then commits. Either every
    /// account lands or none does.
    pub fn init_genesis(&mut self, genesis: &GenesisState) -> LedgerResult<()> {
        let scale = self.manager.config().decimal_scale;
        let mut cache = CacheStore::new(&mut self.store);
        for account in &genesis.accounts {
            let public_key = public_key_from_hex(&account.public_key)?;
            let coin = Coin::from_decimal_str(&account.coin, scale)?;
            let address = crate::crypto::address_from_public_key(&public_key);

            self.manager.deposit(&mut cache, &address, coin, genesis.genesis_time)?;
            self.manager
                .create_account(&mut cache, &account.username, &public_key, genesis.genesis_time)?;
            debug!(username = %account.username, %address, coin = %coin.to_decimal(scale), "genesis account");
        }
        cache.flush()?;
        info!(accounts = genesis.accounts.len(), time = genesis.genesis_time, "genesis initialized");
        self.commit()
    }

    // --- Queries ---

    pub fn get_stake(&self, username: &AccountKey, now: Timestamp) -> LedgerResult<Coin> {
        self.manager.get_stake(&self.store, username, now)
    }

    pub fn get_stake_by_address(&self, address: &Address, now: Timestamp) -> LedgerResult<Coin> {
        self.manager.get_stake_by_address(&self.store, address, now)
    }

    /// Hex digest of every record of `username`, for comparing state across
    /// nodes.
    pub fn account_digest(&self, username: &AccountKey) -> LedgerResult<String> {
        use crate::encoding::CanonicalSerialize;
        Ok(self.manager.snapshot(&self.store, username)?.digest())
    }
}

impl<S: KvStore> std::fmt::Debug for LedgerApp<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerApp").field("config", self.manager.config()).finish()
    }
}
