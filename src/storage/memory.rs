//! In-process storage medium with an optional byte quota.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{Storage, StorageError};

// == Memory Storage ==
/// HashMap-backed [`Storage`].
///
/// When a quota is set, the summed byte length of all keys and values may
/// never exceed it; a write that would is rejected and leaves the previous
/// value in place.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium limited to `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write();

        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(StorageError::QuotaExceeded { needed, available });
            }
        }

        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();

        storage.set("key1", "value1".to_string()).unwrap();
        assert_eq!(storage.get("key1").unwrap().as_deref(), Some("value1"));

        storage.remove("key1").unwrap();
        assert_eq!(storage.get("key1").unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_remove_absent_key() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("nope").is_ok());
    }

    #[test]
    fn test_keys_with_prefix() {
        let storage = MemoryStorage::new();
        storage.set("a.one", "1".to_string()).unwrap();
        storage.set("a.two", "2".to_string()).unwrap();
        storage.set("b.one", "3".to_string()).unwrap();

        let mut keys = storage.keys_with_prefix("a.").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a.one".to_string(), "a.two".to_string()]);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let storage = MemoryStorage::with_quota(10);

        storage.set("k", "12345".to_string()).unwrap();
        let result = storage.set("other", "123456".to_string());

        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.used_bytes(), 6);
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let storage = MemoryStorage::with_quota(10);

        storage.set("k", "123456789".to_string()).unwrap();
        // Overwriting the same key frees the old value first
        storage.set("k", "987654321".to_string()).unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("987654321"));
    }
}
