use sha2::{Digest, Sha256};
use std::collections::VecDeque;

use crate::account::model::{
    AccountBank, AccountInfo, AccountMeta, AccountSnapshot, PendingStake, PendingStakeQueue, Reward,
};
use crate::account::types::{AccountKey, Address, Coin};

/// Trait for objects that have a canonical binary representation for hashing.
/// careful: This must be deterministic across platforms/versions.
pub trait CanonicalSerialize {
    fn canonical_serialize(&self, out: &mut Vec<u8>);

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.canonical_serialize(&mut buf);
        buf
    }

    /// Hex SHA-256 of the canonical bytes.
    fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.to_bytes()))
    }
}

// --- Primitives ---

impl CanonicalSerialize for u8 {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl CanonicalSerialize for u64 {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalSerialize for i64 {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalSerialize for u128 {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalSerialize for str {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        let bytes = self.as_bytes();
        out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(bytes);
    }
}

impl CanonicalSerialize for String {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.as_str().canonical_serialize(out);
    }
}

impl<T: CanonicalSerialize> CanonicalSerialize for Option<T> {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        match self {
            Some(v) => {
                out.push(1);
                v.canonical_serialize(out);
            }
            None => out.push(0),
        }
    }
}

impl<T: CanonicalSerialize> CanonicalSerialize for VecDeque<T> {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for item in self {
            item.canonical_serialize(out);
        }
    }
}

// --- Ledger types ---

impl CanonicalSerialize for Coin {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.units().canonical_serialize(out);
    }
}

impl CanonicalSerialize for AccountKey {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.as_str().canonical_serialize(out);
    }
}

impl CanonicalSerialize for Address {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.as_str().canonical_serialize(out);
    }
}

impl CanonicalSerialize for AccountBank {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.address.canonical_serialize(out);
        self.balance.canonical_serialize(out);
        self.stake.canonical_serialize(out);
        self.username.canonical_serialize(out);
    }
}

impl CanonicalSerialize for PendingStake {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.start_time.canonical_serialize(out);
        self.end_time.canonical_serialize(out);
        self.coin.canonical_serialize(out);
    }
}

impl CanonicalSerialize for PendingStakeQueue {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.last_update_time.canonical_serialize(out);
        self.total_coin.canonical_serialize(out);
        self.stake_in_queue.canonical_serialize(out);
        self.pending_stake_list.canonical_serialize(out);
    }
}

impl CanonicalSerialize for AccountMeta {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.sequence.canonical_serialize(out);
        self.last_activity_time.canonical_serialize(out);
        self.transaction_capacity.canonical_serialize(out);
    }
}

impl CanonicalSerialize for Reward {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.total_income.canonical_serialize(out);
        self.original_income.canonical_serialize(out);
        self.friction_income.canonical_serialize(out);
        self.unclaimed_reward.canonical_serialize(out);
    }
}

impl CanonicalSerialize for AccountInfo {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.username.canonical_serialize(out);
        self.created_at.canonical_serialize(out);
        self.address.canonical_serialize(out);
        self.public_key.canonical_serialize(out);
    }
}

impl CanonicalSerialize for AccountSnapshot {
    fn canonical_serialize(&self, out: &mut Vec<u8>) {
        self.info.canonical_serialize(out);
        self.bank.canonical_serialize(out);
        self.pending_stake_queue.canonical_serialize(out);
        self.meta.canonical_serialize(out);
        self.reward.canonical_serialize(out);
    }
}
