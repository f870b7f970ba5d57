//! Follower and following lists

use super::model::{FollowerList, FollowingList};
use super::types::AccountKey;

fn insert(list: &mut Vec<AccountKey>, key: &AccountKey) -> bool {
    if list.contains(key) {
        return false;
    }
    list.push(key.clone());
    true
}

fn remove(list: &mut Vec<AccountKey>, key: &AccountKey) -> bool {
    match list.iter().position(|k| k == key) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}

impl FollowerList {
    /// Adds `key` unless already present. Returns whether the list changed.
    pub fn insert(&mut self, key: &AccountKey) -> bool {
        insert(&mut self.follower, key)
    }

    /// Removes `key` if present. Returns whether the list changed.
    pub fn remove(&mut self, key: &AccountKey) -> bool {
        remove(&mut self.follower, key)
    }
}

impl FollowingList {
    pub fn insert(&mut self, key: &AccountKey) -> bool {
        insert(&mut self.following, key)
    }

    pub fn remove(&mut self, key: &AccountKey) -> bool {
        remove(&mut self.following, key)
    }
}
