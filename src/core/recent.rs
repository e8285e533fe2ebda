use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::core::{error::OsintError, identifier::NormalizedIdentifier};

pub const RECENT_SEARCHES_KEY: &str = "bharat_osint_recent_searches_v2";
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Recently searched identifiers, newest first, persisted as JSON under
/// [`RECENT_SEARCHES_KEY`]. Unreadable or corrupt files load as empty.
#[derive(Debug, Clone, Default)]
pub struct RecentStore {
    path: Option<PathBuf>,
    entries: Vec<NormalizedIdentifier>,
}

impl RecentStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(data) => parse_entries(&data).unwrap_or_else(|| {
                tracing::warn!("recent store {} is corrupt; starting empty", path.display());
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            path: Some(path.to_path_buf()),
            entries,
        }
    }

    pub fn entries(&self) -> &[NormalizedIdentifier] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&NormalizedIdentifier> {
        self.entries.get(index)
    }

    /// Moves `id` to the front, dropping duplicates and anything past the cap.
    pub fn record(&mut self, id: &NormalizedIdentifier) -> Result<(), OsintError> {
        self.entries.retain(|existing| existing != id);
        self.entries.insert(0, id.clone());
        self.entries.truncate(MAX_RECENT_SEARCHES);
        self.persist()
    }

    pub fn clear(&mut self) -> Result<(), OsintError> {
        self.entries.clear();
        match &self.path {
            Some(path) if path.exists() => {
                fs::remove_file(path).map_err(|e| OsintError::Store(e.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn persist(&self) -> Result<(), OsintError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| OsintError::Store(e.to_string()))?;
        }
        let mut doc = BTreeMap::new();
        doc.insert(RECENT_SEARCHES_KEY, &self.entries);
        let json = serde_json::to_string_pretty(&doc).map_err(|e| OsintError::Store(e.to_string()))?;
        fs::write(path, json).map_err(|e| OsintError::Store(e.to_string()))
    }
}

fn parse_entries(data: &str) -> Option<Vec<NormalizedIdentifier>> {
    let mut doc: BTreeMap<String, serde_json::Value> = serde_json::from_str(data).ok()?;
    let list = doc.remove(RECENT_SEARCHES_KEY)?;
    let mut entries: Vec<NormalizedIdentifier> = serde_json::from_value(list).ok()?;
    entries.truncate(MAX_RECENT_SEARCHES);
    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::validate;

    fn id(raw: &str) -> NormalizedIdentifier {
        validate(raw).normalized().cloned().unwrap()
    }

    #[test]
    fn duplicate_moves_to_front() {
        let mut store = RecentStore::in_memory();
        store.record(&id("9000000001")).unwrap();
        store.record(&id("9000000002")).unwrap();
        store.record(&id("9000000001")).unwrap();
        let listed: Vec<&str> = store.entries().iter().map(|e| e.as_str()).collect();
        assert_eq!(listed, vec!["+91 90000 00001", "+91 90000 00002"]);
    }

    #[test]
    fn sixth_entry_evicts_oldest() {
        let mut store = RecentStore::in_memory();
        for n in 1..=6 {
            store.record(&id(&format!("900000000{n}"))).unwrap();
        }
        assert_eq!(store.entries().len(), MAX_RECENT_SEARCHES);
        assert_eq!(store.entries()[0].as_str(), "+91 90000 00006");
        assert!(!store.entries().contains(&id("9000000001")));
    }

    #[test]
    fn persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("recent.json");
        let mut store = RecentStore::load(&path);
        store.record(&id("7012345678")).unwrap();
        store.record(&id("8012345678")).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains(RECENT_SEARCHES_KEY));

        let reloaded = RecentStore::load(&path);
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn corrupt_or_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RecentStore::load(&dir.path().join("nope.json"));
        assert!(missing.entries().is_empty());

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{not json").unwrap();
        assert!(RecentStore::load(&corrupt).entries().is_empty());

        let wrong_shape = dir.path().join("wrong.json");
        fs::write(&wrong_shape, format!("{{\"{RECENT_SEARCHES_KEY}\": [\"12345\"]}}")).unwrap();
        assert!(RecentStore::load(&wrong_shape).entries().is_empty());
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        let mut store = RecentStore::load(&path);
        store.record(&id("9123456789")).unwrap();
        assert!(path.exists());
        store.clear().unwrap();
        assert!(store.entries().is_empty());
        assert!(!path.exists());
    }
}
