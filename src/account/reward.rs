//! Reward income bookkeeping

use super::model::Reward;
use super::types::Coin;
use crate::error::LedgerResult;

impl Reward {
    /// Credits income from a distribution event. `reward` becomes claimable.
    pub fn accrue(&mut self, income: Coin, reward: Coin) -> LedgerResult<()> {
        let total_income = self.total_income.plus(income, "accrue reward")?;
        let original_income = self.original_income.plus(reward, "accrue reward")?;
        let unclaimed_reward = self.unclaimed_reward.plus(reward, "accrue reward")?;

        self.total_income = total_income;
        self.original_income = original_income;
        self.unclaimed_reward = unclaimed_reward;
        Ok(())
    }

    pub fn accrue_friction(&mut self, amount: Coin) -> LedgerResult<()> {
        let total_income = self.total_income.plus(amount, "accrue friction income")?;
        let friction_income = self.friction_income.plus(amount, "accrue friction income")?;

        self.total_income = total_income;
        self.friction_income = friction_income;
        Ok(())
    }

    /// Empties the claimable reward, returning what was in it.
    pub fn take_unclaimed(&mut self) -> Coin {
        std::mem::take(&mut self.unclaimed_reward)
    }
}
