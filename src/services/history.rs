//! Translation history kept behind a small key-value capability.
//!
//! The history is one JSON array stored under [`HISTORY_KEY`], newest entry
//! first and never longer than [`MAX_ENTRIES`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, WebhookError};
use crate::model::history::HistoryEntry;

pub const HISTORY_KEY: &str = "translationHistory";
pub const MAX_ENTRIES: usize = 20;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// String values in a single JSON object file, rewritten atomically on change.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Map<String, Value> {
        if !self.path.exists() {
            return Map::new();
        }

        let data = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read store");
                return Map::new();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&data) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse store");
                Map::new()
            }
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(map).map_err(|e| WebhookError::Storage(e.to_string()))?;
        write_atomic(&self.path, json.as_bytes())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut map = self.load();
        map.insert(key.to_string(), Value::String(value));
        self.save(&map)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.load();
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    let storage = |e: std::io::Error| WebhookError::Storage(e.to_string());

    if let Some(parent) = tmp.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(storage)?;
    }

    fs::write(&tmp, bytes).map_err(storage)?;
    fs::rename(&tmp, path).map_err(storage)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "history".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

pub struct History {
    store: Box<dyn KeyValueStore>,
}

impl History {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::<MemoryStore>::default())
    }

    /// Stored entries, newest first. Unreadable data counts as no history.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to load history");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "stored history is not valid, ignoring it");
            Vec::new()
        })
    }

    pub fn push(&mut self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.entries();
        entries.insert(0, entry);
        entries.truncate(MAX_ENTRIES);

        let json = serde_json::to_string(&entries).map_err(|e| WebhookError::Storage(e.to_string()))?;
        self.store.set(HISTORY_KEY, json)?;
        debug!(count = entries.len(), "history saved");
        Ok(entries)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(HISTORY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(&format!("原文{n}"), &format!("bản dịch {n}"))
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut h = History::in_memory();
        h.push(entry(1)).unwrap();
        h.push(entry(2)).unwrap();
        let all = h.entries();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].full_original, "原文2");
        assert_eq!(all[1].full_original, "原文1");
    }

    #[test]
    fn twenty_first_insert_evicts_oldest() {
        let mut h = History::in_memory();
        for n in 1..=MAX_ENTRIES {
            h.push(entry(n)).unwrap();
        }
        assert_eq!(h.entries().len(), MAX_ENTRIES);

        let all = h.push(entry(21)).unwrap();
        assert_eq!(all.len(), MAX_ENTRIES);
        assert_eq!(all[0].full_original, "原文21");
        assert!(all.iter().all(|e| e.full_original != "原文1"));
        assert_eq!(all[MAX_ENTRIES - 1].full_original, "原文2");
    }

    #[test]
    fn clear_removes_everything() {
        let mut h = History::in_memory();
        h.push(entry(1)).unwrap();
        h.clear().unwrap();
        assert!(h.entries().is_empty());
    }

    #[test]
    fn garbage_in_store_reads_as_empty() {
        let mut store = MemoryStore::default();
        store.set(HISTORY_KEY, "{not json".into()).unwrap();
        let mut h = History::new(Box::new(store));
        assert!(h.entries().is_empty());
        assert_eq!(h.push(entry(1)).unwrap().len(), 1);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut h = History::new(Box::new(JsonFileStore::new(&path)));
        h.push(entry(1)).unwrap();
        h.push(entry(2)).unwrap();

        let reopened = History::new(Box::new(JsonFileStore::new(&path)));
        let all = reopened.entries();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].full_original, "原文2");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = JsonFileStore::new(&path);
        store.set("theme", "dark".into()).unwrap();
        store.set(HISTORY_KEY, "[]".into()).unwrap();
        store.remove(HISTORY_KEY).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn overwriting_store_leaves_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut h = History::new(Box::new(JsonFileStore::new(&path)));

        for n in 1..=3 {
            h.push(entry(n)).unwrap();
            let raw = fs::read_to_string(&path).unwrap();
            let map: Map<String, Value> = serde_json::from_str(&raw).unwrap();
            let stored: Vec<HistoryEntry> = serde_json::from_str(map[HISTORY_KEY].as_str().unwrap()).unwrap();
            assert_eq!(stored.len(), n);
            assert!(!tmp_path(&path).exists());
        }
    }

    #[test]
    fn missing_or_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::new(&path);
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
        fs::write(&path, "][").unwrap();
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
    }
}
