//! Account ledger
//!
//! Per-account economic state:
//! - Coin deposits that vest into stake over a fixed window
//! - A stake-sized transaction capacity that refills over time
//! - Reward income and claims
//! - Username registration against a funded bank

pub mod types;
pub mod model;
pub mod store;
pub mod vesting;
pub mod capacity;
pub mod reward;
pub mod follow;
pub mod manager;

pub use types::{AccountKey, Address, Coin, Ratio, Timestamp};
pub use model::{
    AccountBank, AccountInfo, AccountMeta, AccountSnapshot, FollowerList, FollowingList, PendingStake, PendingStakeQueue,
    Reward,
};
pub use store::AccountStorage;
pub use vesting::StakeVesting;
pub use capacity::CapacityThrottle;
pub use manager::{AccountManager, Receiver};
