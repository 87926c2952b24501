//! Filesystem-backed store implementations
//!
//! The durable counterpart to the in-memory backend. Layout under the
//! configured root:
//!
//! ```text
//! <root>/metadata/<owner>/<id>.json    serialized Fragment record
//! <root>/data/<owner>/<id>.bin         zstd-compressed payload bytes
//! ```
//!
//! Every I/O failure is wrapped into `Error::Storage` with the operation and
//! `owner/id` key; a raw `io::Error` never reaches callers on its own.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use crate::model::Fragment;
use crate::store::{DataStore, MetadataStore};
use crate::{Error, Result};

/// zstd level for payload files. Matches the default we use everywhere:
/// cheap to compress, fast to decompress.
const COMPRESSION_LEVEL: i32 = 3;

/// Owner ids and fragment ids become path components; refuse anything that
/// could escape the store root.
fn check_component(value: &str, op: &'static str, owner_id: &str, id: &str) -> Result<()> {
    if value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
    {
        return Err(Error::storage(
            op,
            owner_id,
            id,
            io::Error::new(io::ErrorKind::InvalidInput, "invalid key component"),
        ));
    }
    Ok(())
}

async fn ensure_dir(dir: &Path, op: &'static str, owner_id: &str, id: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::storage(op, owner_id, id, e))
}

/// Fragment metadata records as one JSON file per `(owner, id)`.
pub struct DiskMetadataStore {
    root: PathBuf,
}

impl DiskMetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskMetadataStore {
            root: root.into().join("metadata"),
        }
    }

    fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.root.join(owner_id)
    }

    fn record_path(&self, owner_id: &str, id: &str) -> PathBuf {
        self.owner_dir(owner_id).join(format!("{id}.json"))
    }
}

#[async_trait]
impl MetadataStore for DiskMetadataStore {
    async fn put(&self, record: Fragment) -> Result<()> {
        const OP: &str = "write fragment metadata";
        let (owner_id, id) = (record.owner_id.clone(), record.id.clone());
        check_component(&owner_id, OP, &owner_id, &id)?;
        check_component(&id, OP, &owner_id, &id)?;

        ensure_dir(&self.owner_dir(&owner_id), OP, &owner_id, &id).await?;
        let json =
            serde_json::to_vec(&record).map_err(|e| Error::storage(OP, &owner_id, &id, e))?;
        fs::write(self.record_path(&owner_id, &id), json)
            .await
            .map_err(|e| Error::storage(OP, &owner_id, &id, e))?;
        debug!(owner = %owner_id, id = %id, "metadata record written");
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<Fragment>> {
        const OP: &str = "read fragment metadata";
        check_component(owner_id, OP, owner_id, id)?;
        check_component(id, OP, owner_id, id)?;

        match fs::read(self.record_path(owner_id, id)).await {
            Ok(json) => {
                let record = serde_json::from_slice(&json)
                    .map_err(|e| Error::storage(OP, owner_id, id, e))?;
                Ok(Some(record))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(OP, owner_id, id, e)),
        }
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Fragment>> {
        const OP: &str = "list fragments";
        check_component(owner_id, OP, owner_id, "")?;

        let mut dir = match fs::read_dir(self.owner_dir(owner_id)).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::storage(OP, owner_id, "", e)),
        };

        let mut records = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| Error::storage(OP, owner_id, "", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = fs::read(&path)
                .await
                .map_err(|e| Error::storage(OP, owner_id, "", e))?;
            let record: Fragment =
                serde_json::from_slice(&json).map_err(|e| Error::storage(OP, owner_id, "", e))?;
            records.push(record);
        }

        // Directory order is arbitrary; creation time stands in for the
        // memory backend's insertion order.
        records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool> {
        const OP: &str = "delete fragment metadata";
        check_component(owner_id, OP, owner_id, id)?;
        check_component(id, OP, owner_id, id)?;

        match fs::remove_file(self.record_path(owner_id, id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(OP, owner_id, id, e)),
        }
    }
}

/// Payload bytes as one zstd-compressed file per `(owner, id)`.
pub struct DiskDataStore {
    root: PathBuf,
}

impl DiskDataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskDataStore {
            root: root.into().join("data"),
        }
    }

    fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.root.join(owner_id)
    }

    fn payload_path(&self, owner_id: &str, id: &str) -> PathBuf {
        self.owner_dir(owner_id).join(format!("{id}.bin"))
    }
}

#[async_trait]
impl DataStore for DiskDataStore {
    async fn put(&self, owner_id: &str, id: &str, data: Bytes) -> Result<()> {
        const OP: &str = "write fragment data";
        check_component(owner_id, OP, owner_id, id)?;
        check_component(id, OP, owner_id, id)?;

        ensure_dir(&self.owner_dir(owner_id), OP, owner_id, id).await?;
        let compressed = zstd::encode_all(data.as_ref(), COMPRESSION_LEVEL)
            .map_err(|e| Error::storage(OP, owner_id, id, e))?;
        fs::write(self.payload_path(owner_id, id), compressed)
            .await
            .map_err(|e| Error::storage(OP, owner_id, id, e))?;
        debug!(owner = %owner_id, id = %id, size = data.len(), "payload written");
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<Bytes>> {
        const OP: &str = "read fragment data";
        check_component(owner_id, OP, owner_id, id)?;
        check_component(id, OP, owner_id, id)?;

        match fs::read(self.payload_path(owner_id, id)).await {
            Ok(compressed) => {
                let data = zstd::decode_all(compressed.as_slice())
                    .map_err(|e| Error::storage(OP, owner_id, id, e))?;
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(OP, owner_id, id, e)),
        }
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool> {
        const OP: &str = "delete fragment data";
        check_component(owner_id, OP, owner_id, id)?;
        check_component(id, OP, owner_id, id)?;

        match fs::remove_file(self.payload_path(owner_id, id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(OP, owner_id, id, e)),
        }
    }
}
