//! Coin-day vesting: deposits mature linearly into stake over a fixed window
//!
//! Each deposit sits in the address's [`PendingStakeQueue`] until
//! `start_time + window`, when it is retired into `bank.stake`. Until then it
//! contributes `coin * (now - start_time) / window` to the reported stake.
//! The queue carries that progress as one running coin-seconds total so a
//! query only has to look at the entries that matured since the last update.

use tracing::{debug, warn};

use super::model::{AccountBank, PendingStake, PendingStakeQueue};
use super::types::{Coin, Timestamp};
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeVesting {
    window: i64,
}

/// Queue state at some `now`, computed without touching the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settlement {
    matured: usize,
    matured_coin: Coin,
    stake_in_queue: u128,
}

fn coin_seconds(coin: Coin, secs: i64) -> u128 {
    coin.units() as u128 * secs.max(0) as u128
}

impl StakeVesting {
    pub fn new(window: i64) -> Self {
        Self { window }
    }

    fn settle(&self, bank: &AccountBank, queue: &PendingStakeQueue, now: Timestamp) -> LedgerResult<Settlement> {
        if now < queue.last_update_time {
            return Err(LedgerError::InvalidTimestamp {
                op: "settle stake",
                address: bank.address.clone(),
                last: queue.last_update_time,
                now,
            });
        }
        let mut matured = 0;
        let mut matured_coin = Coin::zero();
        let mut credit = queue.stake_in_queue;
        for entry in queue.pending_stake_list.iter() {
            if entry.end_time > now {
                break;
            }
            credit = credit.saturating_sub(coin_seconds(entry.coin, queue.last_update_time - entry.start_time));
            matured_coin = matured_coin.plus(entry.coin, "settle stake")?;
            matured += 1;
        }

        let stake_in_queue = if matured == queue.pending_stake_list.len() {
            0
        } else {
            let remaining = queue.total_coin.saturating_minus(matured_coin);
            credit
                .checked_add(coin_seconds(remaining, now - queue.last_update_time))
                .ok_or(LedgerError::Overflow { op: "settle stake" })?
        };
        Ok(Settlement {
            matured,
            matured_coin,
            stake_in_queue,
        })
    }

    /// Stake of the address at `now`: matured stake plus the linear share of
    /// every queued deposit, truncated. Read-only.
    pub fn stake_at(&self, bank: &AccountBank, queue: &PendingStakeQueue, now: Timestamp) -> LedgerResult<Coin> {
        let settlement = self.settle(bank, queue, now)?;
        let vested = settlement.stake_in_queue / self.window as u128;
        let vested = u64::try_from(vested).map_err(|_| LedgerError::Overflow { op: "get stake" })?;
        bank.stake
            .plus(settlement.matured_coin, "get stake")?
            .plus(Coin::new(vested), "get stake")
    }

    /// Retires every entry whose window has closed by `now` into `bank.stake`
    /// and rolls the queue's vesting progress forward to `now`.
    pub fn advance_to(&self, bank: &mut AccountBank, queue: &mut PendingStakeQueue, now: Timestamp) -> LedgerResult<()> {
        let settlement = self.settle(bank, queue, now)?;
        let stake = bank.stake.plus(settlement.matured_coin, "advance stake")?;

        queue.pending_stake_list.drain(..settlement.matured);
        queue.total_coin = queue.total_coin.saturating_minus(settlement.matured_coin);
        if queue.pending_stake_list.is_empty() {
            queue.total_coin = Coin::zero();
        }
        queue.stake_in_queue = settlement.stake_in_queue;
        queue.last_update_time = now;
        bank.stake = stake;

        if settlement.matured > 0 {
            debug!(
                address = %bank.address,
                retired = settlement.matured,
                coin = %settlement.matured_coin,
                stake = %bank.stake,
                "pending stake matured"
            );
        }
        Ok(())
    }

    pub fn add_coin(
        &self,
        bank: &mut AccountBank,
        queue: &mut PendingStakeQueue,
        amount: Coin,
        now: Timestamp,
    ) -> LedgerResult<()> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount { op: "add coin", amount });
        }
        self.advance_to(bank, queue, now)?;

        let balance = bank.balance.plus(amount, "add coin")?;
        let total_coin = queue.total_coin.plus(amount, "add coin")?;
        let end_time = now
            .checked_add(self.window)
            .ok_or(LedgerError::Overflow { op: "add coin" })?;

        bank.balance = balance;
        queue.total_coin = total_coin;
        queue.pending_stake_list.push_back(PendingStake {
            start_time: now,
            end_time,
            coin: amount,
        });
        debug!(address = %bank.address, %amount, balance = %bank.balance, "coin added");
        Ok(())
    }

    /// Withdraws `amount`, taking it from the newest pending deposits first
    /// and from matured stake only once the queue is empty.
    pub fn minus_coin(
        &self,
        bank: &mut AccountBank,
        queue: &mut PendingStakeQueue,
        amount: Coin,
        now: Timestamp,
    ) -> LedgerResult<()> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount { op: "minus coin", amount });
        }
        self.advance_to(bank, queue, now)?;

        let balance = bank.balance.checked_minus(amount).ok_or_else(|| LedgerError::InsufficientBalance {
            op: "minus coin",
            address: bank.address.clone(),
            requested: amount,
            available: bank.balance,
        })?;
        bank.balance = balance;

        let mut remaining = amount;
        while !remaining.is_zero() {
            let Some(newest) = queue.pending_stake_list.back_mut() else {
                break;
            };
            let elapsed = now - newest.start_time;
            if remaining >= newest.coin {
                let coin = newest.coin;
                queue.stake_in_queue = queue.stake_in_queue.saturating_sub(coin_seconds(coin, elapsed));
                queue.total_coin = queue.total_coin.saturating_minus(coin);
                remaining = remaining.saturating_minus(coin);
                queue.pending_stake_list.pop_back();
            } else {
                queue.stake_in_queue = queue.stake_in_queue.saturating_sub(coin_seconds(remaining, elapsed));
                queue.total_coin = queue.total_coin.saturating_minus(remaining);
                newest.coin = newest.coin.saturating_minus(remaining);
                remaining = Coin::zero();
            }
        }
        if queue.pending_stake_list.is_empty() {
            queue.total_coin = Coin::zero();
            queue.stake_in_queue = 0;
        }

        if !remaining.is_zero() {
            if bank.stake < remaining {
                warn!(
                    address = %bank.address,
                    stake = %bank.stake,
                    %remaining,
                    "withdrawal exceeds stake, clamping at zero"
                );
            }
            bank.stake = bank.stake.saturating_minus(remaining);
        }
        debug!(address = %bank.address, %amount, balance = %bank.balance, stake = %bank.stake, "coin withdrawn");
        Ok(())
    }
}
