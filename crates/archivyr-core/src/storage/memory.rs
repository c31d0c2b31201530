use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Mutex, MutexGuard},
};

use crate::storage::{BackendError, KeyValueStore, ScanPage};

/// Number of keys returned per scan page.
const PAGE_SIZE: usize = 10;

/// An in-process [`KeyValueStore`].
///
/// Keys are kept in sorted order and scanned in pages, so callers exercise the
/// same cursor loop they would against Valkey. Individual keys or whole
/// operations can be made to fail, which is how the store's error paths are
/// tested.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    hashes: BTreeMap<String, HashMap<String, String>>,
    failing_keys: BTreeSet<String>,
    failing_scans: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read of `key` fail.
    pub fn fail_reads_of(&self, key: impl Into<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_keys.insert(key.into());
        }
    }

    /// Makes every subsequent scan fail (or succeed again).
    pub fn fail_scans(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_scans = fail;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, BackendError> {
        self.inner
            .lock()
            .map_err(|_| BackendError::new("in-memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn exists(&self, keys: &[String]) -> Result<u64, BackendError> {
        let inner = self.lock()?;
        Ok(keys.iter().filter(|key| inner.hashes.contains_key(*key)).count() as u64)
    }

    fn set_fields(&self, key: &str, fields: &[(&str, String)]) -> Result<(), BackendError> {
        let mut inner = self.lock()?;
        let hash = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert((*field).to_string(), value.clone());
        }
        Ok(())
    }

    fn get_all_fields(&self, key: &str) -> Result<HashMap<String, String>, BackendError> {
        let inner = self.lock()?;
        if inner.failing_keys.contains(key) {
            return Err(BackendError::new(format!("injected read failure for {key}")));
        }
        Ok(inner.hashes.get(key).cloned().unwrap_or_default())
    }

    fn delete(&self, keys: &[String]) -> Result<u64, BackendError> {
        let mut inner = self.lock()?;
        Ok(keys
            .iter()
            .filter(|key| inner.hashes.remove(*key).is_some())
            .count() as u64)
    }

    fn scan(&self, cursor: u64) -> Result<ScanPage, BackendError> {
        let inner = self.lock()?;
        if inner.failing_scans {
            return Err(BackendError::new("injected scan failure"));
        }

        let start = usize::try_from(cursor).map_err(BackendError::new)?;
        let keys: Vec<String> = inner
            .hashes
            .keys()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect();

        let end = start + keys.len();
        let next = (end < inner.hashes.len()).then_some(end as u64);
        Ok(ScanPage { keys, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: usize) -> String {
        format!("ruleset:rule_{i:02}")
    }

    #[test]
    fn scan_visits_every_key_once() {
        let store = MemoryStore::new();
        for i in 0..25 {
            store.set_fields(&key(i), &[("description", String::new())]).unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = 0;
        let mut pages = 0;
        loop {
            let page = store.scan(cursor).unwrap();
            pages += 1;
            seen.extend(page.keys);
            match page.next {
                Some(next) => cursor = next,
                None => break,
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(seen, (0..25).map(key).collect::<Vec<_>>());
    }

    #[test]
    fn scan_of_empty_store_finishes_immediately() {
        let page = MemoryStore::new().scan(0).unwrap();
        assert!(page.keys.is_empty());
        assert_eq!(page.next, None);
    }

    #[test]
    fn set_fields_merges() {
        let store = MemoryStore::new();
        store
            .set_fields("k", &[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        store.set_fields("k", &[("b", "3".to_string())]).unwrap();

        let fields = store.get_all_fields("k").unwrap();
        assert_eq!(fields["a"], "1");
        assert_eq!(fields["b"], "3");
    }

    #[test]
    fn exists_and_delete_count_keys() {
        let store = MemoryStore::new();
        store.set_fields("a", &[("f", String::new())]).unwrap();

        let keys = vec!["a".to_string(), "b".to_string()];
        assert_eq!(store.exists(&keys).unwrap(), 1);
        assert_eq!(store.delete(&keys).unwrap(), 1);
        assert_eq!(store.exists(&keys).unwrap(), 0);
        assert!(store.get_all_fields("a").unwrap().is_empty());
    }

    #[test]
    fn injected_failures() {
        let store = MemoryStore::new();
        store.fail_reads_of("a");
        assert!(store.get_all_fields("a").is_err());
        assert!(store.get_all_fields("b").is_ok());

        store.fail_scans(true);
        assert!(store.scan(0).is_err());
        store.fail_scans(false);
        assert!(store.scan(0).is_ok());
    }
}
