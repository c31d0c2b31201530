use std::{collections::HashMap, fmt};

/// A failure reported by a key-value backend.
///
/// Wraps the backend's own error type so the store does not depend on any
/// particular client library.
#[derive(Debug)]
pub struct BackendError(Box<dyn std::error::Error + Send + Sync>);

impl BackendError {
    /// Wraps a backend error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

/// One page of a cursor-based key scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanPage {
    /// Keys returned by this page. May be empty even if more pages follow.
    pub keys: Vec<String>,
    /// Cursor for the next page, or `None` once the scan is complete.
    pub next: Option<u64>,
}

/// Hash-map primitives of a remote key-value store.
///
/// Each key holds a map of string fields. Implementations must apply
/// [`set_fields`](Self::set_fields) atomically for a single key.
pub trait KeyValueStore: Send + Sync {
    /// Counts how many of `keys` exist.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend call fails.
    fn exists(&self, keys: &[String]) -> Result<u64, BackendError>;

    /// Writes the given fields to `key`, leaving other fields untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend call fails.
    fn set_fields(&self, key: &str, fields: &[(&str, String)]) -> Result<(), BackendError>;

    /// Reads every field stored under `key`. A missing key yields an empty
    /// map.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend call fails.
    fn get_all_fields(&self, key: &str) -> Result<HashMap<String, String>, BackendError>;

    /// Deletes `keys`, returning how many existed.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend call fails.
    fn delete(&self, keys: &[String]) -> Result<u64, BackendError>;

    /// Returns the page of keys starting at `cursor`. Scans start at cursor
    /// `0`.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend call fails.
    fn scan(&self, cursor: u64) -> Result<ScanPage, BackendError>;
}
