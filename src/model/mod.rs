//! Core data model types for fragstore

mod fragment;

pub use fragment::{Fragment, SUPPORTED_TYPES};
