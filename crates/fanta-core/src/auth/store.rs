//! Persisted key-value storage for session tokens.
//!
//! All stores expose the same get/set/remove interface over fixed string keys
//! so the session layer does not care where tokens actually live.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

/// Key for the short-lived access token
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Key for the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Scratch file renamed over the session file on write
const SESSION_TMP_FILE: &str = "session.json.tmp";

/// Keychain service name
const SERVICE_NAME: &str = "fantaclient";

pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Token store lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
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
}

/// JSON file store in the cache directory.
///
/// The file is re-read on every access so separate processes see each
/// other's writes. Writes are last-writer-wins.
pub struct FileTokenStore {
    cache_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            guard: Mutex::new(()),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&path)
            .context("Failed to read session file")?;
        serde_json::from_str(&contents).context("Failed to parse session file")
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<()> {
        let path = self.session_path();
        if entries.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        // Readers never see a half-written file
        let tmp = self.cache_dir.join(SESSION_TMP_FILE);
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &path).context("Failed to replace session file")?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.guard
            .lock()
            .map_err(|_| anyhow::anyhow!("Token store lock poisoned"))
    }

    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self.lock()?;
        let mut entries = self.read_all()?;
        f(&mut entries);
        self.write_all(&entries)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(key, "Persisting token");
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    /// An unreadable session file is discarded so logout always succeeds
    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session file");
                return self.write_all(&HashMap::new());
            }
        };
        entries.remove(key);
        self.write_all(&entries)
    }
}

/// OS keychain store, one entry per key.
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        store.set(ACCESS_TOKEN_KEY, "def").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("def"));

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        // Removing twice is fine
        store.remove(ACCESS_TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(ACCESS_TOKEN_KEY, "access-1").unwrap();
        store.set(REFRESH_TOKEN_KEY, "refresh-1").unwrap();

        let reopened = FileTokenStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("access-1"));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_file_store_removes_file_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested"));

        store.set(ACCESS_TOKEN_KEY, "a").unwrap();
        assert!(dir.path().join("nested").join(SESSION_FILE).exists());

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert!(!dir.path().join("nested").join(SESSION_FILE).exists());
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();

        let store = FileTokenStore::new(dir.path().to_path_buf());
        assert!(store.get(ACCESS_TOKEN_KEY).is_err());
    }

    #[test]
    fn test_file_store_remove_discards_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        // Truncated mid-write
        std::fs::write(dir.path().join(SESSION_FILE), r#"{"token": "abc"#).unwrap();

        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert!(!dir.path().join(SESSION_FILE).exists());
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);

        // Usable again afterwards
        store.set(ACCESS_TOKEN_KEY, "fresh").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_file_store_write_leaves_no_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(ACCESS_TOKEN_KEY, "a").unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").unwrap();

        assert!(dir.path().join(SESSION_FILE).exists());
        assert!(!dir.path().join(SESSION_TMP_FILE).exists());
    }
}
