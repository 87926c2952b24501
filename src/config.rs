//! Process startup configuration
//!
//! Backend selection is resolved exactly once, here, into an explicit struct
//! that gets injected into the service. Nothing in this crate reads the
//! environment at any other point.

use std::env;
use std::path::PathBuf;

use crate::{Error, Result};

/// Selects the storage backend (`memory` or `disk`).
pub const BACKEND_ENV: &str = "FRAGSTORE_BACKEND";

/// Root directory for the disk backend.
pub const DATA_DIR_ENV: &str = "FRAGSTORE_DATA_DIR";

/// Which pair of metadata/data stores to run on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// Nothing survives the process; for development and tests.
    Memory,
    /// JSON records and compressed payload files under the given root.
    Disk(PathBuf),
}

/// Resolved startup configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub backend: StorageBackend,
}

impl Config {
    pub fn memory() -> Self {
        Config {
            backend: StorageBackend::Memory,
        }
    }

    pub fn disk(root: impl Into<PathBuf>) -> Self {
        Config {
            backend: StorageBackend::Disk(root.into()),
        }
    }

    /// Resolve configuration from the environment.
    ///
    /// - `FRAGSTORE_BACKEND=memory` selects the in-memory pair.
    /// - `FRAGSTORE_BACKEND=disk` selects the disk pair and requires
    ///   `FRAGSTORE_DATA_DIR`.
    /// - With no backend set, a present `FRAGSTORE_DATA_DIR` implies disk,
    ///   otherwise memory.
    ///
    /// Contradictory or unknown values are a startup error, never a silent
    /// fallback.
    pub fn from_env() -> Result<Self> {
        let backend = env::var(BACKEND_ENV).ok();
        let data_dir = env::var(DATA_DIR_ENV).ok().map(PathBuf::from);

        match (backend.as_deref(), data_dir) {
            (Some("memory"), _) => Ok(Config::memory()),
            (Some("disk"), Some(dir)) => Ok(Config::disk(dir)),
            (Some("disk"), None) => Err(Error::Config(format!(
                "{BACKEND_ENV}=disk requires {DATA_DIR_ENV}"
            ))),
            (Some(other), _) => Err(Error::Config(format!(
                "unknown {BACKEND_ENV} value: {other}"
            ))),
            (None, Some(dir)) => Ok(Config::disk(dir)),
            (None, None) => Ok(Config::memory()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var reads in these tests are serialized by a lock because the
    // process environment is global.
    use std::sync::Mutex;
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env(vars: &[(&str, Option<&str>)], check: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap();
        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
        check();
        for (key, _) in vars {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults_to_memory() {
        with_env(&[(BACKEND_ENV, None), (DATA_DIR_ENV, None)], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.backend, StorageBackend::Memory);
        });
    }

    #[test]
    fn test_data_dir_implies_disk() {
        with_env(
            &[(BACKEND_ENV, None), (DATA_DIR_ENV, Some("/tmp/frags"))],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(
                    config.backend,
                    StorageBackend::Disk(PathBuf::from("/tmp/frags"))
                );
            },
        );
    }

    #[test]
    fn test_disk_without_dir_is_an_error() {
        with_env(
            &[(BACKEND_ENV, Some("disk")), (DATA_DIR_ENV, None)],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(matches!(err, Error::Config(_)));
            },
        );
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        with_env(
            &[(BACKEND_ENV, Some("s3")), (DATA_DIR_ENV, None)],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(matches!(err, Error::Config(_)));
            },
        );
    }

    #[test]
    fn test_explicit_memory_ignores_data_dir() {
        with_env(
            &[(BACKEND_ENV, Some("memory")), (DATA_DIR_ENV, Some("/tmp/x"))],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.backend, StorageBackend::Memory);
            },
        );
    }
}
