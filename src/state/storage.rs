use log::warn;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Synchronous string key-value storage the prediction store persists into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

/// In-process store, used by tests and when no config directory is writable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// All keys in one JSON object file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("ignoring corrupt store {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("cannot read store {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        if let Err(e) = self.write_file() {
            warn!("failed to write {}: {e}", self.path.display());
        }
    }

    fn write_file(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let payload = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("serialize store failed: {e}"))?;
        fs::write(&self.path, payload).map_err(|e| format!("write store failed: {e}"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }
}

/// Whether the directory holding `path` exists or can be created.
pub fn can_persist_to(path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).is_ok(),
        _ => true,
    }
}

/// `$XDG_CONFIG_HOME/sumo-yoso/predictions.json`, then `~/.config/...`, then the cwd.
pub fn default_store_path() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("sumo-yoso").join("predictions.json");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home)
            .join(".config")
            .join("sumo-yoso")
            .join("predictions.json");
    }
    PathBuf::from("predictions.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", "1");
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a");
        assert_eq!(store.get("a"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("predictions.json");

        let mut store = FileStore::open(&path);
        store.set("predictions:202601:1:makuuchi", r#"{"0":"W"}"#);
        drop(store);

        let mut reopened = FileStore::open(&path);
        assert_eq!(
            reopened.get("predictions:202601:1:makuuchi").as_deref(),
            Some(r#"{"0":"W"}"#)
        );

        reopened.remove("predictions:202601:1:makuuchi");
        let again = FileStore::open(&path);
        assert_eq!(again.get("predictions:202601:1:makuuchi"), None);
    }

    #[test]
    fn persist_check_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("predictions.json");
        assert!(can_persist_to(&path));
        assert!(dir.path().join("a").join("b").is_dir());
        assert!(can_persist_to(Path::new("predictions.json")));

        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        assert!(!can_persist_to(&blocker.join("predictions.json")));
    }

    #[test]
    fn unreadable_store_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.json");
        fs::write(&path, [0xFF, 0xFE, 0x00]).unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("anything"), None);
        assert_eq!(
            fs::read_to_string(&path).unwrap_err().kind(),
            ErrorKind::InvalidData
        );
    }

    #[test]
    fn corrupt_store_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("anything"), None);
        store.set("k", "v");
        assert_eq!(FileStore::open(&path).get("k").as_deref(), Some("v"));
    }
}
