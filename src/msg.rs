use serde::{Deserialize, Serialize};

use crate::account::{AccountKey, Address, Coin, Ratio, Receiver};
use crate::crypto::public_key_from_hex;
use crate::error::{LedgerError, LedgerResult};

/// Every state transition the ledger accepts from a block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum LedgerMsg {
    Deposit {
        address: Address,
        amount: Coin,
    },
    DepositToAccount {
        username: AccountKey,
        amount: Coin,
    },
    Withdraw {
        username: AccountKey,
        amount: Coin,
    },
    Transfer {
        sender: AccountKey,
        receiver: Receiver,
        amount: Coin,
        #[serde(default)]
        memo: String,
    },
    Follow {
        follower: AccountKey,
        followee: AccountKey,
    },
    Unfollow {
        follower: AccountKey,
        followee: AccountKey,
    },
    CheckCapacity {
        username: AccountKey,
        ratio: Ratio,
    },
    AccrueReward {
        username: AccountKey,
        income: Coin,
        reward: Coin,
    },
    AccrueFrictionIncome {
        username: AccountKey,
        amount: Coin,
    },
    ClaimReward {
        username: AccountKey,
    },
    CreateAccount {
        username: AccountKey,
        public_key: String, // hex ed25519
    },
    IncreaseSequence {
        username: AccountKey,
    },
}

/// What a successfully delivered message produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsgOutcome {
    Done,
    CapacityRemaining(Coin),
    Claimed(Coin),
    AccountCreated(Address),
    Sequence(u64),
}

impl LedgerMsg {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerMsg::Deposit { .. } => "deposit",
            LedgerMsg::DepositToAccount { .. } => "deposit_to_account",
            LedgerMsg::Withdraw { .. } => "withdraw",
            LedgerMsg::Transfer { .. } => "transfer",
            LedgerMsg::Follow { .. } => "follow",
            LedgerMsg::Unfollow { .. } => "unfollow",
            LedgerMsg::CheckCapacity { .. } => "check_capacity",
            LedgerMsg::AccrueReward { .. } => "accrue_reward",
            LedgerMsg::AccrueFrictionIncome { .. } => "accrue_friction_income",
            LedgerMsg::ClaimReward { .. } => "claim_reward",
            LedgerMsg::CreateAccount { .. } => "create_account",
            LedgerMsg::IncreaseSequence { .. } => "increase_sequence",
        }
    }

    /// Stateless checks, run before the message touches the store.
    pub fn validate_basic(&self) -> LedgerResult<()> {
        let op = self.name();
        match self {
            LedgerMsg::Deposit { amount, .. }
            | LedgerMsg::DepositToAccount { amount, .. }
            | LedgerMsg::Withdraw { amount, .. } => {
                if amount.is_zero() {
                    return Err(LedgerError::InvalidAmount { op, amount: *amount });
                }
            }
            LedgerMsg::Transfer { sender, receiver, amount, .. } => {
                if amount.is_zero() {
                    return Err(LedgerError::InvalidAmount { op, amount: *amount });
                }
                if receiver.is_empty() {
                    return Err(LedgerError::UnknownReceiver {
                        sender: sender.clone(),
                        receiver: String::new(),
                    });
                }
            }
            LedgerMsg::CheckCapacity { ratio, .. } => {
                if ratio.denom() == 0 {
                    return Err(LedgerError::InvalidAmount {
                        op,
                        amount: Coin::new(ratio.numer()),
                    });
                }
            }
            LedgerMsg::CreateAccount { public_key, .. } => {
                public_key_from_hex(public_key)?;
            }
            LedgerMsg::AccrueReward { .. }
            | LedgerMsg::AccrueFrictionIncome { .. }
            | LedgerMsg::ClaimReward { .. }
            | LedgerMsg::IncreaseSequence { .. }
            | LedgerMsg::Follow { .. }
            | LedgerMsg::Unfollow { .. } => {}
        }
        Ok(())
    }
}
