//! Stake-sized transaction capacity

use tracing::{debug, warn};

use super::model::AccountMeta;
use super::types::{AccountKey, Coin, Ratio, Timestamp};
use crate::error::{LedgerError, LedgerResult};

/// Token bucket whose ceiling is the account's current stake. An empty
/// bucket refills to the ceiling over `recover_period` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityThrottle {
    recover_period: i64,
    decimal_scale: u64,
}

impl CapacityThrottle {
    pub fn new(recover_period: i64, decimal_scale: u64) -> Self {
        Self {
            recover_period,
            decimal_scale,
        }
    }

    /// Cost of one operation charged at `ratio` of a whole coin.
    pub fn cost(&self, ratio: Ratio) -> LedgerResult<Coin> {
        ratio.mul_floor(self.decimal_scale)
    }

    /// Capacity available at `now`. A recorded capacity above the ceiling
    /// is kept as is; below it, capacity grows by `ceiling * elapsed / period`
    /// and stops at the ceiling.
    pub fn recovered(&self, meta: &AccountMeta, ceiling: Coin, now: Timestamp) -> LedgerResult<Coin> {
        let capacity = meta.transaction_capacity;
        if capacity >= ceiling {
            return Ok(capacity);
        }
        let elapsed = (now - meta.last_activity_time).max(0);
        if elapsed >= self.recover_period {
            return Ok(ceiling);
        }
        let increase = ceiling.units() as u128 * elapsed as u128 / self.recover_period as u128;
        let increase = u64::try_from(increase).map_err(|_| LedgerError::Overflow { op: "recover capacity" })?;
        Ok(capacity.plus(Coin::new(increase), "recover capacity")?.min(ceiling))
    }

    /// Charges one operation against `meta`. On success the clock moves to
    /// `now` and the remaining capacity is returned. On rejection `meta`
    /// still carries the recovered capacity but the clock stays put.
    pub fn check(
        &self,
        account: &AccountKey,
        meta: &mut AccountMeta,
        ceiling: Coin,
        ratio: Ratio,
        now: Timestamp,
    ) -> LedgerResult<Coin> {
        let recovered = self.recovered(meta, ceiling, now)?;
        let cost = self.cost(ratio)?;
        meta.transaction_capacity = recovered;

        match recovered.checked_minus(cost) {
            Some(remaining) => {
                meta.transaction_capacity = remaining;
                meta.last_activity_time = now;
                debug!(%account, %cost, %remaining, "capacity charged");
                Ok(remaining)
            }
            None => {
                warn!(%account, %cost, available = %recovered, "capacity not enough");
                Err(LedgerError::CapacityNotEnough {
                    account: account.clone(),
                    cost,
                    available: recovered,
                })
            }
        }
    }
}
