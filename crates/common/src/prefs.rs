//! Key-value preference storage.
//!
//! The calibration engine never touches disk itself; it reads and writes its
//! baseline through a [`PreferenceStore`] supplied by the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{WiscreenError, WiscreenResult};

/// Float-valued key-value store.
pub trait PreferenceStore {
    /// Stored value for `key`, or `default` when unset.
    fn get_float(&self, key: &str, default: f64) -> f64;

    fn contains(&self, key: &str) -> bool;

    fn set_float(&mut self, key: &str, value: f64) -> WiscreenResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> WiscreenResult<()>;

    /// Delete every key.
    fn clear(&mut self) -> WiscreenResult<()>;
}

/// Volatile store for tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_float(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn set_float(&mut self, key: &str, value: f64) -> WiscreenResult<()> {
        check_finite(key, value)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> WiscreenResult<()> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> WiscreenResult<()> {
        self.values.clear();
        Ok(())
    }
}

/// On-disk document written by [`JsonFileStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefsDocument {
    /// Last write time (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified_at: Option<String>,

    #[serde(default)]
    values: BTreeMap<String, f64>,
}

/// Store persisted as a small JSON file, rewritten on every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: PrefsDocument,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file reads as an empty store.
    pub fn open(path: impl AsRef<Path>) -> WiscreenResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                WiscreenError::store(format!("Corrupt preference file {}: {e}", path.display()))
            })?
        } else {
            PrefsDocument::default()
        };

        tracing::debug!(path = %path.display(), keys = document.values.len(), "Opened preference store");
        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time of the last write, if the file has ever been written.
    pub fn modified_at(&self) -> Option<&str> {
        self.document.modified_at.as_deref()
    }

    /// Write `document` to disk and adopt it. On failure the store keeps
    /// its previous contents.
    fn persist(&mut self, mut document: PrefsDocument) -> WiscreenResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        document.modified_at = Some(chrono::Utc::now().to_rfc3339());
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, json)?;
        self.document = document;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get_float(&self, key: &str, default: f64) -> f64 {
        self.document.values.get(key).copied().unwrap_or(default)
    }

    fn contains(&self, key: &str) -> bool {
        self.document.values.contains_key(key)
    }

    fn set_float(&mut self, key: &str, value: f64) -> WiscreenResult<()> {
        check_finite(key, value)?;
        let mut next = self.document.clone();
        next.values.insert(key.to_string(), value);
        self.persist(next)
    }

    fn remove(&mut self, key: &str) -> WiscreenResult<()> {
        if !self.contains(key) {
            return Ok(());
        }
        let mut next = self.document.clone();
        next.values.remove(key);
        self.persist(next)
    }

    fn clear(&mut self) -> WiscreenResult<()> {
        let next = PrefsDocument {
            values: BTreeMap::new(),
            ..self.document.clone()
        };
        self.persist(next)
    }
}

fn check_finite(key: &str, value: f64) -> WiscreenResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(WiscreenError::store(format!(
            "Refusing to store non-finite value {value} under '{key}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_float("BASELINE_RATIO", 0.15), 0.15);
        assert!(!store.contains("BASELINE_RATIO"));

        store.set_float("BASELINE_RATIO", 0.12).unwrap();
        assert_eq!(store.get_float("BASELINE_RATIO", 0.15), 0.12);
        assert!(store.contains("BASELINE_RATIO"));

        store.remove("BASELINE_RATIO").unwrap();
        store.remove("BASELINE_RATIO").unwrap();
        assert_eq!(store.get_float("BASELINE_RATIO", 0.15), 0.15);
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_rejects_nan() {
        let mut store = MemoryStore::new();
        assert!(store.set_float("k", f64::NAN).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = std::env::temp_dir().join("wiscreen_test_prefs");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("prefs.json");

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            assert!(store.modified_at().is_none());
            store.set_float("BASELINE_RATIO", 0.2).unwrap();
        }

        let mut reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_float("BASELINE_RATIO", 0.15), 0.2);
        assert!(reopened.modified_at().is_some());

        reopened.clear().unwrap();
        let cleared = JsonFileStore::open(&path).unwrap();
        assert!(!cleared.contains("BASELINE_RATIO"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = std::env::temp_dir().join("wiscreen_test_prefs_corrupt");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, WiscreenError::Store { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_store_failed_write_keeps_previous_values() {
        let dir = std::env::temp_dir().join("wiscreen_test_prefs_failed_write");
        let _ = std::fs::remove_dir_all(&dir);
        let nested = dir.join("nested");
        let path = nested.join("prefs.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_float("BASELINE_RATIO", 0.2).unwrap();

        // Replace the parent directory with a regular file.
        std::fs::remove_dir_all(&nested).unwrap();
        std::fs::write(&nested, "blocker").unwrap();

        assert!(store.set_float("BASELINE_RATIO", 0.4).is_err());
        assert_eq!(store.get_float("BASELINE_RATIO", 0.15), 0.2);
        assert!(store.set_float("OTHER", 0.4).is_err());
        assert!(!store.contains("OTHER"));
        assert!(store.remove("BASELINE_RATIO").is_err());
        assert!(store.contains("BASELINE_RATIO"));
        assert!(store.clear().is_err());
        assert!(store.contains("BASELINE_RATIO"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
