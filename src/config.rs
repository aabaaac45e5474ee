//! CABINET - Store Configuration
//! Selects the backend, validation rules and decorators at startup.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::CabinetError;
use crate::types::RecordId;
use crate::validator::ValidationProfile;

/// Which backend holds the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StorageKind {
    #[default]
    Memory,
    File,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::File => f.write_str("file"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File),
            _ => Err(CabinetError::Config(format!("unknown storage '{}'", s))),
        }
    }
}

/// Configuration for a cabinet store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend selection.
    pub storage: StorageKind,

    /// Data file used by the file backend.
    pub data_file: PathBuf,

    /// Validation rules applied on create and edit.
    pub validation: ValidationProfile,

    /// First id handed out by an empty store.
    pub start_id: RecordId,

    /// Whether to sync the data file after every write.
    pub sync_writes: bool,

    /// Wrap the store in a `MeteredStore`.
    pub use_stopwatch: bool,

    /// Wrap the store in a `LoggingStore`.
    pub use_logger: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageKind::Memory,
            data_file: PathBuf::from("./cabinet.db"),
            validation: ValidationProfile::Default,
            start_id: 1,
            sync_writes: true,
            use_stopwatch: false,
            use_logger: false,
        }
    }
}

impl Config {
    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    pub fn with_validation(mut self, validation: ValidationProfile) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_start_id(mut self, start_id: RecordId) -> Self {
        self.start_id = start_id;
        self
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn with_stopwatch(mut self, enabled: bool) -> Self {
        self.use_stopwatch = enabled;
        self
    }

    pub fn with_logger(mut self, enabled: bool) -> Self {
        self.use_logger = enabled;
        self
    }

    /// Ensure the data file's directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        match self.data_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.validation, ValidationProfile::Default);
        assert_eq!(config.start_id, 1);
        assert!(!config.use_stopwatch);
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_storage("FILE".parse().unwrap())
            .with_validation(ValidationProfile::Custom)
            .with_start_id(100)
            .with_data_file("/tmp/x.db");
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.start_id, 100);
        assert_eq!(config.data_file, PathBuf::from("/tmp/x.db"));
        assert!("disk".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_data_file(dir.path().join("a/b/cabinet.db"));
        config.ensure_dirs().unwrap();
        assert!(dir.path().join("a/b").is_dir());
        Config::default().with_data_file("cabinet.db").ensure_dirs().unwrap();
    }
}
