//! # fragstore
//!
//! Per-owner storage for opaque binary "fragments" of user content, with
//! content negotiation on read.
//!
//! A fragment is a small metadata record plus a raw payload, kept under
//! independent keys in two stores. Reads may ask for another representation
//! by appending an extension to the fragment id (`<id>.html`); a static
//! registry decides which conversions a stored mime type allows and performs
//! the byte transform.
//!
//! ## Core concepts
//!
//! - **Fragment**: metadata record (`id`, `ownerId`, timestamps, `type`,
//!   `size`) plus payload bytes stored separately
//! - **Owner**: the authenticated principal a fragment belongs to; fragments
//!   are never visible across owners
//! - **Conversion registry**: base mime type → ordered allowed targets, with
//!   a dispatcher for the actual transforms
//!
//! ## Example
//!
//! ```ignore
//! use fragstore::{Config, FragmentService};
//!
//! let service = FragmentService::from_config(&Config::from_env()?);
//! let fragment = service.create(owner, "text/markdown", body).await?;
//! let (mime, html) = service.get(owner, &format!("{}.html", fragment.id)).await?;
//! ```

pub mod config;
pub mod convert;
pub mod model;
pub mod store;

mod error;
mod service;

pub use config::{Config, StorageBackend};
pub use convert::BaseType;
pub use error::{Error, Result};
pub use model::{Fragment, SUPPORTED_TYPES};
pub use service::{FragmentService, Listing};
