//! JSON-file backed storage
//!
//! The whole store is one JSON object. Writes go to a sibling temp file that
//! is then renamed over the original, so a crash never leaves half a file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{KeyValueStorage, StorageResult};

pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// `~/.local/share/service-monitor/dashboard.json` (platform data dir)
    pub fn default_path() -> PathBuf {
        dirs_next::data_dir()
            .map(|dir| dir.join("service-monitor").join("dashboard.json"))
            .unwrap_or_else(|| PathBuf::from("dashboard.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still consistent: it is only replaced after a successful flush.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let mut entries = self.lock();
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.lock();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("dashboard.json");

        let store = FileStorage::open(&path).unwrap();
        store.set("darkMode", "true".into()).unwrap();
        store.set("token", "t".into()).unwrap();
        store.remove("token").unwrap();
        drop(store);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("darkMode").unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.get("token").unwrap(), None);
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        let store = FileStorage::open(&path).unwrap();
        store.set("darkMode", "false".into()).unwrap();

        // A directory where the temp file goes makes every flush fail
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        assert!(store.set("darkMode", "true".into()).is_err());
        assert!(store.remove("darkMode").is_err());
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("false"));

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("darkMode").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileStorage::open(&path),
            Err(super::super::traits::StorageError::Corrupt(_))
        ));
    }
}
