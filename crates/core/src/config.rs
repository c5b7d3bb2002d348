//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handlers never read process-wide environment variables.

use crate::constants::DEFAULT_DB_PATH;
use crate::{EchoError, EchoResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    db_path: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `EchoError::InvalidConfig` if `db_path` is empty or points at a directory.
    pub fn new(db_path: PathBuf) -> EchoResult<Self> {
        if db_path.as_os_str().is_empty() {
            return Err(EchoError::InvalidConfig("db path cannot be empty".into()));
        }
        if db_path.is_dir() {
            return Err(EchoError::InvalidConfig(format!(
                "db path is a directory: {}",
                db_path.display()
            )));
        }

        Ok(Self { db_path })
    }

    /// Location of the JSON store holding the registry and the examination log.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Resolve the store path from an optional environment value.
///
/// `None` or a blank value yields [`DEFAULT_DB_PATH`].
pub fn db_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn blank_env_value_falls_back_to_default() {
        assert_eq!(db_path_from_env_value(None), PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(
            db_path_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_DB_PATH)
        );
        assert_eq!(
            db_path_from_env_value(Some(" /data/echo.json ".into())),
            PathBuf::from("/data/echo.json")
        );
    }

    #[test]
    fn new_rejects_directory_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = CoreConfig::new(temp_dir.path().to_path_buf())
            .expect_err("directory should be rejected");
        assert!(matches!(err, EchoError::InvalidConfig(_)));
    }

    #[test]
    fn new_accepts_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("db.json");
        let cfg = CoreConfig::new(path.clone()).expect("missing file is fine");
        assert_eq!(cfg.db_path(), path.as_path());
    }
}
