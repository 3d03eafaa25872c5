//! Key-value cache for usernames, sessions and query results.
//!
//! Values are strings; callers serialize with `serde_json`. There is no
//! expiry. An entry stays until [`KeyValueCache::remove`] or
//! [`KeyValueCache::clear`].

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result};

/// Well-known cache keys.
pub mod keys {
    /// Resolved default username.
    pub const USERNAME: &str = "username";
    /// Serialized session record.
    pub const CONNECTION: &str = "connection";
    /// Base URL for setup links.
    pub const BASE_URL: &str = "baseUrl";
    /// Entity list.
    pub const RESPONSE: &str = "response";

    /// Field list for one entity.
    pub fn fields(entity: &str) -> String {
        format!("fields.{entity}")
    }
}

/// String-keyed, string-valued cache.
pub trait KeyValueCache: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns true if the key is present.
    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Delete a value. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// List the stored keys.
    fn keys(&self) -> Result<Vec<String>>;

    /// Delete every value.
    fn clear(&self) -> Result<()> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }
}

impl<C: KeyValueCache + ?Sized> KeyValueCache for Arc<C> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn has(&self, key: &str) -> Result<bool> {
        (**self).has(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::new(ErrorKind::Cache("memory cache lock poisoned".to_string())))
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

/// One JSON file per key under a directory.
///
/// Files are written to a temporary file in the same directory and renamed
/// into place. On Unix they are readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileCache {
    base_path: PathBuf,
}

/// Entry with storage metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: String,
    stored_at: chrono::DateTime<chrono::Utc>,
}

impl FileCache {
    /// Cache under the default directory.
    ///
    /// Default path: `<user cache dir>/sobject-browser/`
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(default_cache_dir()?))
    }

    /// Cache under a custom directory.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            base_path: path.as_ref().to_path_buf(),
        }
    }

    /// The cache directory.
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// File path for a key.
    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_key = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();

        self.base_path.join(format!("{safe_key}.json"))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.base_path.exists() {
            std::fs::create_dir_all(&self.base_path)?;
        }
        Ok(())
    }

    fn read_entry(&self, path: &Path) -> Result<Option<StoredEntry>> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&json) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache file");
                Ok(None)
            }
        }
    }
}

impl KeyValueCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self.read_entry(&self.entry_path(key))?;
        // Two keys can sanitize to the same file name; only the exact key counts.
        Ok(entry.filter(|e| e.key == key).map(|e| e.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        let stored = StoredEntry {
            key: key.to_string(),
            value: value.to_string(),
            stored_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.base_path)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(tmp.path(), perms)?;
        }

        let path = self.entry_path(key);
        tmp.persist(&path).map_err(|e| {
            Error::with_source(
                ErrorKind::Cache(format!("could not write {}", path.display())),
                e.error,
            )
        })?;

        debug!(key, "Cache entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(stored) = self.read_entry(&path)? {
                    keys.push(stored.key);
                }
            }
        }

        Ok(keys)
    }

    fn clear(&self) -> Result<()> {
        if !self.base_path.exists() {
            return Ok(());
        }

        for entry in std::fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                std::fs::remove_file(&path)?;
            }
        }

        Ok(())
    }
}

/// Get the default cache directory.
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().ok_or_else(|| {
        Error::new(ErrorKind::Config(
            "Could not find the user cache directory".to_string(),
        ))
    })?;

    Ok(base.join("sobject-browser"))
}

// ============================================================================
// Namespacing
// ============================================================================

/// Prefixes every key with `<namespace>.`, so caches for different orgs
/// can share one backend.
#[derive(Debug, Clone)]
pub struct NamespacedCache<C> {
    inner: C,
    prefix: String,
}

impl<C: KeyValueCache> NamespacedCache<C> {
    /// Wrap `inner` under `namespace`.
    pub fn new(inner: C, namespace: impl AsRef<str>) -> Self {
        Self {
            inner,
            prefix: format!("{}.", namespace.as_ref()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl<C: KeyValueCache> KeyValueCache for NamespacedCache<C> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(&self.full_key(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(&self.full_key(key), value)
    }

    fn has(&self, key: &str) -> Result<bool> {
        self.inner.has(&self.full_key(key))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(&self.full_key(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .inner
            .keys()?
            .into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
            .collect())
    }
}
