//! Key-value persistence for entity collections
//!
//! Every collection lives under its own key and is always written whole.
//! Two backends are provided: [`JsonDirStore`] keeps one `<key>.json` file
//! per collection in a directory, [`MemoryStore`] keeps values in memory.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Storage key of an entity collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    Orders,
    Doctors,
    Prosthetics,
    Employees,
    Suppliers,
    Invoices,
    Declarations,
}

impl CollectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Orders => "orders",
            CollectionKey::Doctors => "doctors",
            CollectionKey::Prosthetics => "prosthetics",
            CollectionKey::Employees => "employees",
            CollectionKey::Suppliers => "suppliers",
            CollectionKey::Invoices => "invoices",
            CollectionKey::Declarations => "declarations",
        }
    }

    /// All keys, in export order
    pub fn all() -> &'static [CollectionKey] {
        &[
            CollectionKey::Orders,
            CollectionKey::Doctors,
            CollectionKey::Prosthetics,
            CollectionKey::Employees,
            CollectionKey::Suppliers,
            CollectionKey::Invoices,
            CollectionKey::Declarations,
        ]
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKey::all()
            .iter()
            .find(|key| key.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown collection: {}", s))
    }
}

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("collection '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: CollectionKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode collection: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("write rejected by storage: {0}")]
    Rejected(String),
}

/// Persistence interface consumed by the lab service
pub trait Storage {
    /// Read a collection; `None` when the key has never been written
    fn load(&self, key: CollectionKey) -> Result<Option<Value>, StorageError>;

    /// Overwrite a collection with a new value
    fn save(&mut self, key: CollectionKey, value: &Value) -> Result<(), StorageError>;
}

/// One pretty-printed JSON file per collection
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a collection
    pub fn path_for(&self, key: CollectionKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for JsonDirStore {
    fn load(&self, key: CollectionKey) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        let value = serde_json::from_str(&content)
            .map_err(|source| StorageError::Corrupt { key, source })?;
        Ok(Some(value))
    }

    fn save(&mut self, key: CollectionKey, value: &Value) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut content = serde_json::to_string_pretty(value)?;
        content.push('\n');

        // Write next to the target, then rename over it
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, content).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }
}

/// In-memory store, optionally refusing writes
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<CollectionKey, Value>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a collection
    pub fn with_entry(mut self, key: CollectionKey, value: Value) -> Self {
        self.entries.insert(key, value);
        self
    }

    /// Make every subsequent `save` fail
    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    pub fn get(&self, key: CollectionKey) -> Option<&Value> {
        self.entries.get(&key)
    }
}

impl Storage for MemoryStore {
    fn load(&self, key: CollectionKey) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(&key).cloned())
    }

    fn save(&mut self, key: CollectionKey, value: &Value) -> Result<(), StorageError> {
        if self.reject_writes {
            return Err(StorageError::Rejected(format!("{} is read-only", key)));
        }
        self.entries.insert(key, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_dir_store_missing_key_is_none() {
        let tmp = tempdir().unwrap();
        let store = JsonDirStore::new(tmp.path().join("data"));
        assert!(store.load(CollectionKey::Orders).unwrap().is_none());
    }

    #[test]
    fn test_dir_store_save_then_load() {
        let tmp = tempdir().unwrap();
        let mut store = JsonDirStore::new(tmp.path().join("data"));
        let value = json!([{ "id": 1 }]);

        store.save(CollectionKey::Doctors, &value).unwrap();

        assert!(tmp.path().join("data/doctors.json").exists());
        assert!(!tmp.path().join("data/.doctors.json.tmp").exists());
        assert_eq!(store.load(CollectionKey::Doctors).unwrap(), Some(value));
    }

    #[test]
    fn test_dir_store_reports_corrupt_file() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("orders.json"), "[{").unwrap();
        let store = JsonDirStore::new(tmp.path());

        let err = store.load(CollectionKey::Orders).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Corrupt {
                key: CollectionKey::Orders,
                ..
            }
        ));
    }

    #[test]
    fn test_memory_store_rejects_writes_when_asked() {
        let mut store = MemoryStore::new();
        store.save(CollectionKey::Orders, &json!([])).unwrap();
        store.set_reject_writes(true);

        assert!(store.save(CollectionKey::Orders, &json!([1])).is_err());
        assert_eq!(store.get(CollectionKey::Orders), Some(&json!([])));
    }

    #[test]
    fn test_collection_key_parse() {
        assert_eq!("invoices".parse::<CollectionKey>().unwrap(), CollectionKey::Invoices);
        assert!("patients".parse::<CollectionKey>().is_err());
    }
}
