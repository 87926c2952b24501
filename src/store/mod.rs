//! Split storage abstraction
//!
//! A fragment's metadata record and its payload bytes live under independent
//! keys in the same `(owner_id, id)` namespace, in two different stores.
//! There is no transaction across the pair: the service layer sequences the
//! two calls and documents the consistency window.
//!
//! Both traits report "key not found" (`Ok(None)` / `Ok(false)`) distinctly
//! from "store unreachable" (`Err(Error::Storage)`).

mod disk;
mod memory;

pub use disk::{DiskDataStore, DiskMetadataStore};
pub use memory::{MemoryDataStore, MemoryMetadataStore};

use async_trait::async_trait;
use bytes::Bytes;

use crate::model::Fragment;
use crate::Result;

/// Persists fragment metadata records keyed by `(owner_id, id)`.
///
/// Operations for the same key must be linearizable: a read following a
/// completed write observes that write. Different owners never interfere.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert or replace the record for `(record.owner_id, record.id)`.
    async fn put(&self, record: Fragment) -> Result<()>;

    /// Point lookup. `Ok(None)` means no record for the key.
    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<Fragment>>;

    /// All records for an owner, in insertion order. Unknown owners get an
    /// empty list, not an error.
    async fn list(&self, owner_id: &str) -> Result<Vec<Fragment>>;

    /// Remove the record. `Ok(false)` when no record existed.
    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool>;
}

/// Persists raw payload bytes keyed by `(owner_id, id)`.
///
/// `get` fully materializes the payload before returning; callers always see
/// a complete buffer, never a partial read.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn put(&self, owner_id: &str, id: &str, data: Bytes) -> Result<()>;

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<Bytes>>;

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool>;
}
