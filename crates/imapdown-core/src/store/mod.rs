//! Content-addressed record storage.
//!
//! The archive only ever asks two things of a store: does a record exist
//! under this key, and write this record under this key. Records are never
//! updated or removed.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::Result;
use crate::key::StoreKey;

/// Key-addressed, write-once record storage.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns true if a record is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn exists(&self, key: &StoreKey) -> Result<bool>;

    /// Stores `contents` under `key`.
    ///
    /// A reader never observes a partially written record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    async fn write(&self, key: &StoreKey, contents: &[u8]) -> Result<()>;
}
