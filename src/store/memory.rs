//! In-memory store implementations
//!
//! Backing for development and tests. Each map is guarded by a
//! `parking_lot::RwLock`; every operation holds the lock for its full
//! duration and never awaits while holding it, which is what makes same-key
//! operations linearizable.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::model::Fragment;
use crate::store::{DataStore, MetadataStore};
use crate::Result;

/// Metadata records per owner, in insertion order.
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: RwLock<HashMap<String, Vec<Fragment>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn put(&self, record: Fragment) -> Result<()> {
        let mut records = self.records.write();
        let owned = records.entry(record.owner_id.clone()).or_default();
        match owned.iter_mut().find(|r| r.id == record.id) {
            // Replace in place so insertion order is stable across updates
            Some(existing) => *existing = record,
            None => owned.push(record),
        }
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<Fragment>> {
        let records = self.records.read();
        Ok(records
            .get(owner_id)
            .and_then(|owned| owned.iter().find(|r| r.id == id).cloned()))
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Fragment>> {
        let records = self.records.read();
        Ok(records.get(owner_id).cloned().unwrap_or_default())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool> {
        let mut records = self.records.write();
        let Some(owned) = records.get_mut(owner_id) else {
            return Ok(false);
        };
        match owned.iter().position(|r| r.id == id) {
            Some(pos) => {
                owned.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Payload bytes per `(owner, id)` key.
#[derive(Default)]
pub struct MemoryDataStore {
    payloads: RwLock<HashMap<String, HashMap<String, Bytes>>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn put(&self, owner_id: &str, id: &str, data: Bytes) -> Result<()> {
        let mut payloads = self.payloads.write();
        payloads
            .entry(owner_id.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<Bytes>> {
        let payloads = self.payloads.read();
        Ok(payloads
            .get(owner_id)
            .and_then(|owned| owned.get(id).cloned()))
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool> {
        let mut payloads = self.payloads.write();
        Ok(payloads
            .get_mut(owner_id)
            .is_some_and(|owned| owned.remove(id).is_some()))
    }
}
