//! Runtime configuration from environment variables.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `FOOD_ORDER_STORAGE` | `memory`, `file` | `file` |
//! | `FOOD_ORDER_STORAGE_DIR` | path | `.food-order` |
//! | `FOOD_ORDER_BROADCAST_CAPACITY` | positive integer | `16` |
//!
//! Missing or unparsable values fall back to the default with a warning.

use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
use food_order_runtime::StoreConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local, lost on exit
    Memory,
    /// JSON files in a directory
    #[default]
    File,
}

/// Cart configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Where the cart is persisted
    pub storage: StorageBackend,
    /// Directory for [`StorageBackend::File`]
    pub storage_dir: PathBuf,
    /// Snapshots buffered per subscriber
    pub broadcast_capacity: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::File,
            storage_dir: PathBuf::from(".food-order"),
            broadcast_capacity: StoreConfig::default().broadcast_capacity,
        }
    }
}

impl CartConfig {
    /// Reads the configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let storage = match lookup("FOOD_ORDER_STORAGE").as_deref().map(str::trim) {
            None => defaults.storage,
            Some(v) if v.eq_ignore_ascii_case("memory") => StorageBackend::Memory,
            Some(v) if v.eq_ignore_ascii_case("file") => StorageBackend::File,
            Some(other) => {
                tracing::warn!(value = other, "Unknown FOOD_ORDER_STORAGE, using file");
                defaults.storage
            },
        };

        let storage_dir = lookup("FOOD_ORDER_STORAGE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or(defaults.storage_dir, PathBuf::from);

        let broadcast_capacity = match lookup("FOOD_ORDER_BROADCAST_CAPACITY") {
            None => defaults.broadcast_capacity,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(value = %raw, "Invalid FOOD_ORDER_BROADCAST_CAPACITY, using default");
                    defaults.broadcast_capacity
                },
            },
        };

        Self {
            storage,
            storage_dir,
            broadcast_capacity,
        }
    }

    /// Opens the configured storage backend
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the storage directory cannot be created.
    pub fn build_storage(&self) -> Result<Arc<dyn KeyValueStorage>, StorageError> {
        let storage: Arc<dyn KeyValueStorage> = match self.storage {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File => Arc::new(FileStorage::open(self.storage_dir.clone())?),
        };
        Ok(storage)
    }

    /// Runtime store configuration
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_broadcast_capacity(self.broadcast_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(CartConfig::from_lookup(lookup(&[])), CartConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = CartConfig::from_lookup(lookup(&[
            ("FOOD_ORDER_STORAGE", "Memory"),
            ("FOOD_ORDER_STORAGE_DIR", "/tmp/carts"),
            ("FOOD_ORDER_BROADCAST_CAPACITY", "64"),
        ]));

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/carts"));
        assert_eq!(config.store_config().broadcast_capacity, 64);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = CartConfig::from_lookup(lookup(&[
            ("FOOD_ORDER_STORAGE", "redis"),
            ("FOOD_ORDER_STORAGE_DIR", "  "),
            ("FOOD_ORDER_BROADCAST_CAPACITY", "0"),
        ]));

        assert_eq!(config, CartConfig::default());
    }

    #[test]
    fn builds_file_storage_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = CartConfig {
            storage_dir: dir.path().join("carts"),
            ..CartConfig::default()
        };

        let storage = config.build_storage().unwrap();
        storage.set("k", "v").unwrap();

        assert!(dir.path().join("carts").join("k.json").exists());
    }
}
