//! High-level fragment service
//!
//! Orchestrates the entity, the two stores, and read-time conversion into the
//! five use cases the transport layer consumes. The service never touches
//! credentials: it trusts the `owner_id` the (already-authenticated) caller
//! supplies.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, StorageBackend};
use crate::convert;
use crate::model::Fragment;
use crate::store::{
    DataStore, DiskDataStore, DiskMetadataStore, MemoryDataStore, MemoryMetadataStore,
    MetadataStore,
};
use crate::{Error, Result};

/// A listing of an owner's fragments: bare ids by default, full metadata
/// records when expanded. Never payload bytes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Ids(Vec<String>),
    Records(Vec<Fragment>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Ids(ids) => ids.len(),
            Listing::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The main service interface
///
/// Composes a [`MetadataStore`] and a [`DataStore`]. There is no transaction
/// across the pair: create and update write the payload first so an
/// interruption leaves an orphaned payload rather than metadata pointing at
/// missing data. That window is an accepted limitation.
pub struct FragmentService {
    metadata: Arc<dyn MetadataStore>,
    data: Arc<dyn DataStore>,
}

impl FragmentService {
    pub fn new(metadata: Arc<dyn MetadataStore>, data: Arc<dyn DataStore>) -> Self {
        FragmentService { metadata, data }
    }

    /// Build the store pair the configuration names.
    pub fn from_config(config: &Config) -> Self {
        match &config.backend {
            StorageBackend::Memory => Self::new(
                Arc::new(MemoryMetadataStore::new()),
                Arc::new(MemoryDataStore::new()),
            ),
            StorageBackend::Disk(root) => Self::new(
                Arc::new(DiskMetadataStore::new(root)),
                Arc::new(DiskDataStore::new(root)),
            ),
        }
    }

    /// Create a fragment from a request body and its declared Content-Type.
    ///
    /// Validation happens before any store write. Payload goes first, then
    /// the metadata record, since the record is the externally visible
    /// "fragment exists" signal.
    pub async fn create(
        &self,
        owner_id: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<Fragment> {
        if body.is_empty() {
            return Err(Error::DataRequired);
        }

        let mut fragment = Fragment::new(owner_id, content_type)?;
        fragment.set_size(body.len() as u64);

        self.data.put(owner_id, &fragment.id, body).await?;
        self.metadata.put(fragment.clone()).await?;

        info!(
            owner = %owner_id,
            id = %fragment.id,
            content_type = %fragment.content_type,
            size = fragment.size,
            "fragment created"
        );
        Ok(fragment)
    }

    /// Read a fragment's payload, optionally transcoded.
    ///
    /// `name` is either a bare fragment id or `<id>.<ext>`; a recognized
    /// extension requests conversion to its mime type, and an unrecognized
    /// suffix is treated as part of the id. Returns the response mime type
    /// and the bytes.
    pub async fn get(&self, owner_id: &str, name: &str) -> Result<(String, Bytes)> {
        let (id, target) = split_extension(name);
        let fragment = self.require(owner_id, id).await?;
        let payload = self.payload_of(&fragment).await?;

        match target {
            None => Ok((fragment.content_type.clone(), payload)),
            Some(target_mime) => {
                debug!(
                    owner = %owner_id,
                    id = %id,
                    from = %fragment.mime_type(),
                    to = %target_mime,
                    "converting fragment"
                );
                let converted = convert::convert(fragment.mime_type(), &payload, target_mime)?;
                Ok((target_mime.to_string(), Bytes::from(converted)))
            }
        }
    }

    /// Read a fragment's metadata record only.
    pub async fn get_info(&self, owner_id: &str, id: &str) -> Result<Fragment> {
        self.require(owner_id, id).await
    }

    /// List an owner's fragments. An owner with none gets an empty listing,
    /// not an error.
    pub async fn list(&self, owner_id: &str, expand: bool) -> Result<Listing> {
        let records = self.metadata.list(owner_id).await?;
        Ok(if expand {
            Listing::Records(records)
        } else {
            Listing::Ids(records.into_iter().map(|r| r.id).collect())
        })
    }

    /// Overwrite a fragment's payload. Fragments are not retypable: the
    /// declared Content-Type must equal the stored one exactly.
    pub async fn update(
        &self,
        owner_id: &str,
        id: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<Fragment> {
        if !Fragment::is_supported_type(content_type) {
            return Err(Error::UnsupportedType(content_type.to_string()));
        }
        if body.is_empty() {
            return Err(Error::DataRequired);
        }

        let mut fragment = self.require(owner_id, id).await?;
        if fragment.content_type != content_type {
            warn!(
                owner = %owner_id,
                id = %id,
                stored = %fragment.content_type,
                given = %content_type,
                "update with mismatched content type"
            );
            return Err(Error::TypeMismatch {
                stored: fragment.content_type.clone(),
                given: content_type.to_string(),
            });
        }

        fragment.set_size(body.len() as u64);
        self.data.put(owner_id, id, body).await?;
        self.metadata.put(fragment.clone()).await?;

        info!(owner = %owner_id, id = %id, size = fragment.size, "fragment updated");
        Ok(fragment)
    }

    /// Delete a fragment's metadata and payload.
    ///
    /// The two removals are sequential with no rollback: if the payload
    /// removal fails after the record is gone, the error surfaces and the
    /// orphaned payload stays. Callers must tolerate that as a known
    /// limitation.
    pub async fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        if !self.metadata.delete(owner_id, id).await? {
            warn!(owner = %owner_id, id = %id, "delete of unknown fragment");
            return Err(Error::NotFound);
        }
        self.data.delete(owner_id, id).await?;
        info!(owner = %owner_id, id = %id, "fragment deleted");
        Ok(())
    }

    async fn require(&self, owner_id: &str, id: &str) -> Result<Fragment> {
        match self.metadata.get(owner_id, id).await? {
            Some(fragment) => Ok(fragment),
            None => {
                warn!(owner = %owner_id, id = %id, "fragment not found");
                Err(Error::NotFound)
            }
        }
    }

    async fn payload_of(&self, fragment: &Fragment) -> Result<Bytes> {
        match self.data.get(&fragment.owner_id, &fragment.id).await? {
            Some(payload) => Ok(payload),
            // Metadata without payload: the half-written side of the
            // documented consistency window.
            None => Err(Error::NotFound),
        }
    }
}

/// Split `<id>.<ext>` into the id and the conversion target the extension
/// names. A suffix that is not a known extension belongs to the id.
fn split_extension(name: &str) -> (&str, Option<&'static str>) {
    match name.rsplit_once('.') {
        Some((id, ext)) if !id.is_empty() => match convert::extension_to_mime(ext) {
            Some(mime) => (id, Some(mime)),
            None => (name, None),
        },
        _ => (name, None),
    }
}
