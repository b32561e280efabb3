//! Key-value persistence seam.
//!
//! The usage ledger only needs to read a handful of keys and write them back
//! together. `UsageStore` implements this on SQLite. Tests use `MemoryStore`,
//! which keeps everything in a map and can simulate an unavailable store.

use std::collections::HashMap;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(test)]
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub trait KeyValueStore {
    /// Returns the values of the requested keys that are present.
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Writes all entries, or none of them.
    fn set(&mut self, entries: Vec<(&str, Value)>) -> Result<()>;

    fn size_bytes(&self) -> u64 {
        0
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    fail_reads: bool,
    fail_writes: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.values
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }

    fn set(&mut self, entries: Vec<(&str, Value)>) -> Result<()> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        for (key, value) in entries {
            self.values.insert(key.to_string(), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_returns_only_present_keys() {
        let mut store = MemoryStore::new();
        store.set(vec![("a", json!(1.5))]).unwrap();

        let values = store.get(&["a", "b"]).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["a"], json!(1.5));
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);

        let result = store.set(vec![("a", json!(1)), ("b", json!(2))]);
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.raw("a").is_none());
        assert!(store.raw("b").is_none());
    }
}
