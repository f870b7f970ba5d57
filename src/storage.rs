use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("cannot encode record for {key}: {reason}")]
    Encode { key: String, reason: String },
}

/// Byte-level key-value contract the ledger persists through.
///
/// Reads and writes are synchronous. `flush` pushes buffered writes to
/// whatever sits underneath (the parent store, or disk).
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;
    fn flush(&mut self) -> Result<(), StoreError>;
}

// Generic Helper: Put
pub fn put<S: KvStore + ?Sized, T: Serialize>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError> {
    let serialized = bincode::serialize(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key.as_bytes(), serialized)
}

// Generic Helper: Get
pub fn get<S: KvStore + ?Sized, T: for<'a> Deserialize<'a>>(store: &S, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key.as_bytes())? {
        Some(data) => {
            let deserialized = bincode::deserialize(&data).map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Some(deserialized))
        }
        None => Ok(None),
    }
}

/// Ordered in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.entries.insert(key.to_vec(), value);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Persistent store on a sled database.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .path(path)
            .flush_every_ms(None)
            .open()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(SledStore { db })
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.db
            .get(key)
            .map(|v| v.map(|ivec| ivec.to_vec()))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.db
            .insert(key, value)
            .map(|_| ())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// Write buffer over a parent store. Reads see buffered writes first;
/// `flush` writes them through to the parent. Dropping the cache without
/// flushing discards every buffered write.
pub struct CacheStore<'a, S: KvStore + ?Sized> {
    parent: &'a mut S,
    writes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl<'a, S: KvStore + ?Sized> CacheStore<'a, S> {
    pub fn new(parent: &'a mut S) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    pub fn discard(&mut self) {
        self.writes.clear();
    }
}

impl<S: KvStore + ?Sized> KvStore for CacheStore<'_, S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.writes.insert(key.to_vec(), value);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        for (key, value) in std::mem::take(&mut self.writes) {
            self.parent.set(&key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Record {
        name: String,
        amount: u64,
    }

    #[test]
    fn test_typed_round_trip() {
        let mut store = MemoryStore::new();
        let record = Record { name: "alice".to_string(), amount: 42 };
        put(&mut store, "rec/alice", &record).unwrap();

        let loaded: Option<Record> = get(&store, "rec/alice").unwrap();
        assert_eq!(loaded, Some(record));
        assert_eq!(get::<_, Record>(&store, "rec/bob").unwrap(), None);
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let mut store = MemoryStore::new();
        store.set(b"rec/bad", vec![1]).unwrap();
        let err = get::<_, Record>(&store, "rec/bad").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "rec/bad"));
    }

    #[test]
    fn test_cache_flush_and_discard() {
        let mut parent = MemoryStore::new();
        parent.set(b"a", vec![1]).unwrap();

        {
            let mut cache = CacheStore::new(&mut parent);
            cache.set(b"a", vec![2]).unwrap();
            cache.set(b"b", vec![3]).unwrap();
            assert_eq!(cache.get(b"a").unwrap(), Some(vec![2]));
            assert_eq!(cache.pending_writes(), 2);
            // dropped without flush
        }
        assert_eq!(parent.get(b"a").unwrap(), Some(vec![1]));
        assert_eq!(parent.get(b"b").unwrap(), None);

        {
            let mut cache = CacheStore::new(&mut parent);
            cache.set(b"b", vec![3]).unwrap();
            cache.flush().unwrap();
            assert_eq!(cache.pending_writes(), 0);
        }
        assert_eq!(parent.get(b"b").unwrap(), Some(vec![3]));
    }

    #[test]
    fn test_sled_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SledStore::open(dir.path()).unwrap();
            put(&mut store, "rec/alice", &Record { name: "alice".to_string(), amount: 7 }).unwrap();
            store.flush().unwrap();
        }
        let store = SledStore::open(dir.path()).unwrap();
        let loaded: Option<Record> = get(&store, "rec/alice").unwrap();
        assert_eq!(loaded.map(|r| r.amount), Some(7));
    }
}
