//! Error types for fragstore

use thiserror::Error;

/// Result type alias for fragstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fragstore operations
///
/// Every variant maps to a fixed HTTP status via [`Error::status`]; the
/// transport layer sets response codes from that and never needs to inspect
/// variants individually.
#[derive(Error, Debug)]
pub enum Error {
    #[error("ownerId is required")]
    OwnerRequired,

    #[error("type is required")]
    TypeRequired,

    #[error("data is required")]
    DataRequired,

    #[error("unsupported media type: {0}")]
    UnsupportedType(String),

    #[error("Fragment not found")]
    NotFound,

    #[error("Fragment type did not match")]
    TypeMismatch { stored: String, given: String },

    #[error("conversion from {from} to {to} is not allowed")]
    ConversionNotAllowed { from: String, to: String },

    #[error("conversion to {to} failed: {reason}")]
    ConversionFailed { to: String, reason: String },

    /// A metadata or data store could not complete an operation. Wraps the
    /// backend's error with enough context (operation, owner/id key) to log;
    /// the raw transport error never crosses this boundary on its own.
    #[error("unable to {op} for {key}")]
    Storage {
        op: &'static str,
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Build an [`Error::Storage`] for a failed store operation on `owner/id`.
    pub fn storage(
        op: &'static str,
        owner_id: &str,
        id: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Storage {
            op,
            key: format!("{owner_id}/{id}"),
            source: Box::new(source),
        }
    }

    /// The HTTP status code the transport collaborator should respond with.
    pub fn status(&self) -> u16 {
        match self {
            Error::OwnerRequired
            | Error::TypeRequired
            | Error::DataRequired
            | Error::TypeMismatch { .. } => 400,
            Error::NotFound => 404,
            Error::UnsupportedType(_)
            | Error::ConversionNotAllowed { .. }
            | Error::ConversionFailed { .. } => 415,
            Error::Storage { .. } | Error::Config(_) => 500,
        }
    }
}
