use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use parking_lot::Mutex;

use crate::store::schema::PreferencesData;

const PREFERENCES_FILE: &str = "preferences.json";

/// Where the user's confirmed layout lives between sessions.
pub trait PreferenceStore: Send + Sync {
    fn load_layout(&self) -> Option<String>;
    fn save_layout(&self, layout_id: &str) -> Result<()>;
}

pub struct JsonPreferenceStore {
    base_dir: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyadapt");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(PREFERENCES_FILE)
    }

    /// Missing, unreadable and stale-schema files all read as "no preference".
    pub fn load(&self) -> PreferencesData {
        let path = self.file_path();
        let Ok(content) = fs::read_to_string(&path) else {
            return PreferencesData::default();
        };
        match serde_json::from_str::<PreferencesData>(&content) {
            Ok(data) if !data.needs_reset() => data,
            Ok(_) => {
                log::warn!("ignoring {} written by another schema version", path.display());
                PreferencesData::default()
            }
            Err(e) => {
                log::warn!("ignoring unreadable {}: {e}", path.display());
                PreferencesData::default()
            }
        }
    }

    pub fn save(&self, data: &PreferencesData) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn load_layout(&self) -> Option<String> {
        self.load().layout_id
    }

    fn save_layout(&self, layout_id: &str) -> Result<()> {
        self.save(&PreferencesData::with_layout(layout_id))
    }
}

/// In-process store for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    layout: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_layout(&self) -> Option<String> {
        self.layout.lock().clone()
    }

    fn save_layout(&self, layout_id: &str) -> Result<()> {
        *self.layout.lock() = Some(layout_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::SCHEMA_VERSION;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonPreferenceStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonPreferenceStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_empty_store_has_no_layout() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.load_layout(), None);
    }

    #[test]
    fn test_save_then_load() {
        let (dir, store) = make_test_store();
        store.save_layout("qwertz-ch").unwrap();
        assert_eq!(store.load_layout().as_deref(), Some("qwertz-ch"));
        assert!(dir.path().join("preferences.json").exists());
        assert!(!dir.path().join("preferences.tmp").exists());

        let data = store.load();
        assert_eq!(data.schema_version, SCHEMA_VERSION);
        assert!(data.saved_at.is_some());
    }

    #[test]
    fn test_later_save_wins() {
        let (_dir, store) = make_test_store();
        store.save_layout("qwerty-us").unwrap();
        store.save_layout("dvorak-us").unwrap();
        assert_eq!(store.load_layout().as_deref(), Some("dvorak-us"));
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let (dir, store) = make_test_store();
        fs::write(dir.path().join("preferences.json"), "{not json").unwrap();
        assert_eq!(store.load_layout(), None);
    }

    #[test]
    fn test_stale_schema_is_ignored() {
        let (dir, store) = make_test_store();
        fs::write(
            dir.path().join("preferences.json"),
            r#"{"schema_version": 99, "layout_id": "azerty-fr", "saved_at": null}"#,
        )
        .unwrap();
        assert_eq!(store.load_layout(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.load_layout(), None);
        store.save_layout("colemak-us").unwrap();
        assert_eq!(store.load_layout().as_deref(), Some("colemak-us"));
    }
}
