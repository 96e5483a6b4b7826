//! In-memory store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::Store;
use crate::Result;
use crate::key::StoreKey;

/// Store backed by a map, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<StoreKey, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<StoreKey, Vec<u8>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the record stored under `key`.
    #[must_use]
    pub fn get(&self, key: &StoreKey) -> Option<Vec<u8>> {
        self.records().get(key).cloned()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Returns every stored key.
    #[must_use]
    pub fn keys(&self) -> Vec<StoreKey> {
        self.records().keys().copied().collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn exists(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.records().contains_key(key))
    }

    async fn write(&self, key: &StoreKey, contents: &[u8]) -> Result<()> {
        self.records().insert(*key, contents.to_vec());
        Ok(())
    }
}
