//! Fragment entity - the metadata half of a stored unit of user content

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::convert;
use crate::{Error, Result};

/// Content types a fragment may be created with.
///
/// Matching is an exact string comparison against the Content-Type value the
/// caller passes, not a semantic MIME parse; the one charset-qualified
/// variant we accept is listed explicitly.
pub const SUPPORTED_TYPES: [&str; 12] = [
    "text/plain",
    "text/plain; charset=utf-8",
    "text/markdown",
    "text/html",
    "text/csv",
    "application/json",
    "application/yaml",
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/avif",
    "image/gif",
];

/// A fragment's metadata record.
///
/// The payload bytes live in a separate data store under the same
/// `(owner_id, id)` key; this record is what listing and point lookups
/// return. Serialized field names (`ownerId`, `type`) are part of the
/// persisted record layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Opaque unique identifier, generated at creation, immutable after
    pub id: String,

    /// The owning principal; fragments are never visible across owners
    #[serde(rename = "ownerId")]
    pub owner_id: String,

    /// Creation timestamp (ISO-8601, UTC), set once at construction
    pub created: DateTime<Utc>,

    /// Refreshed on every metadata save or payload write
    pub updated: DateTime<Utc>,

    /// Declared Content-Type, immutable after creation
    #[serde(rename = "type")]
    pub content_type: String,

    /// Byte count of the payload, tracks the last payload write
    pub size: u64,
}

impl Fragment {
    /// Create a new fragment with a generated id and zero size.
    ///
    /// Validation order is fixed: owner present, type present, type
    /// supported. (`size` is a `u64`, so the non-negative check of the
    /// original record format is enforced by the type system.)
    pub fn new(owner_id: impl Into<String>, content_type: impl Into<String>) -> Result<Self> {
        let owner_id = owner_id.into();
        let content_type = content_type.into();

        if owner_id.is_empty() {
            return Err(Error::OwnerRequired);
        }
        if content_type.is_empty() {
            return Err(Error::TypeRequired);
        }
        if !Self::is_supported_type(&content_type) {
            return Err(Error::UnsupportedType(content_type));
        }

        let now = Utc::now();
        Ok(Fragment {
            id: Uuid::new_v4().to_string(),
            owner_id,
            created: now,
            updated: now,
            content_type,
            size: 0,
        })
    }

    /// True if we know how to work with this Content-Type value.
    pub fn is_supported_type(value: &str) -> bool {
        SUPPORTED_TYPES.contains(&value)
    }

    /// The mime type without parameters:
    /// `"text/plain; charset=utf-8"` -> `"text/plain"`
    pub fn mime_type(&self) -> &str {
        match self.content_type.split_once(';') {
            Some((mime, _)) => mime.trim_end(),
            None => &self.content_type,
        }
    }

    /// True if this fragment holds a `text/*` mime type.
    pub fn is_text(&self) -> bool {
        self.mime_type().starts_with("text/")
    }

    /// The mime types this fragment can be converted to, in registry order.
    ///
    /// Empty for a base type the conversion registry does not know, even
    /// though construction already validated `content_type`.
    pub fn formats(&self) -> &'static [&'static str] {
        convert::formats(self.mime_type())
    }

    /// Record a payload write: update `size` and stamp `updated`.
    ///
    /// Mutates the in-memory record only; persisting the metadata is a
    /// separate store call, so callers needing consistency must save too.
    pub fn set_size(&mut self, size: u64) {
        self.size = size;
        self.updated = Utc::now();
    }

    /// Stamp `updated` ahead of a metadata save.
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}
