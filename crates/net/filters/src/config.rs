//! Persisted node configuration access for the filter list.
//!
//! The store is only ever used read-modify-write by a single writer within
//! one operation; multi-process locking is out of scope.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use auto_impl::auto_impl;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// The slice of node configuration this crate reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SwarmConfig {
    /// Ordered, duplicate-free list of filter masks in textual form.
    pub addr_filters: Vec<String>,
}

/// Read-modify-write access to the persisted configuration.
#[auto_impl(&, Box, Arc)]
pub trait ConfigStore: Send + Sync {
    fn read(&self) -> Result<SwarmConfig, ConfigStoreError>;
    fn write(&self, config: &SwarmConfig) -> Result<(), ConfigStoreError>;
}

/// JSON file store. A missing file reads as the default config.
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the store, making parent directories if needed.
    pub fn new_with_create_dir(path: impl Into<PathBuf>) -> Result<Self, ConfigStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn read(&self) -> Result<SwarmConfig, ConfigStoreError> {
        if !self.path.exists() {
            return Ok(SwarmConfig::default());
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| ConfigStoreError::Serialization(e.to_string()))
    }

    fn write(&self, config: &SwarmConfig) -> Result<(), ConfigStoreError> {
        // Write to temp file first, then rename (atomic)
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, config)
                .map_err(|e| ConfigStoreError::Serialization(e.to_string()))?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// In-memory store with write-failure injection for tests.
#[derive(Default)]
pub struct MemoryConfigStore {
    config: RwLock<SwarmConfig>,
    fail_next_write: AtomicBool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `write` fail with a storage error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self) -> Result<SwarmConfig, ConfigStoreError> {
        Ok(self.config.read().clone())
    }

    fn write(&self, config: &SwarmConfig) -> Result<(), ConfigStoreError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(ConfigStoreError::Storage(
                "injected write failure".to_string(),
            ));
        }
        *self.config.write() = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileConfigStore::new(dir.path().join("config.json"));

        let config = SwarmConfig {
            addr_filters: vec![
                "/ip4/10.0.0.0/ipcidr/8".to_string(),
                "/ip4/192.168.0.0/ipcidr/16".to_string(),
            ],
        };
        store.write(&config).unwrap();

        assert_eq!(store.read().unwrap(), config);
    }

    #[test]
    fn test_file_store_missing_file_reads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileConfigStore::new(dir.path().join("config.json"));

        assert_eq!(store.read().unwrap(), SwarmConfig::default());
    }

    #[test]
    fn test_memory_store_write_failure_injection() {
        let store = MemoryConfigStore::new();
        let config = SwarmConfig {
            addr_filters: vec!["/ip4/10.0.0.0/ipcidr/8".to_string()],
        };

        store.fail_next_write();
        assert_matches!(store.write(&config), Err(ConfigStoreError::Storage(_)));
        assert_eq!(store.read().unwrap(), SwarmConfig::default());

        // The injected failure is one-shot.
        store.write(&config).unwrap();
        assert_eq!(store.read().unwrap(), config);
    }
}
