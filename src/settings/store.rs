//! Settings persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use super::types::Settings;
use crate::error::{Result, SubsyncError};

/// Persistence for the full settings object.
pub trait SettingsStore: Send + Sync {
    /// Current persisted state.
    ///
    /// Absent state is an empty [`Settings`]; state that exists but cannot
    /// be read is an error, so callers never save defaults over it.
    fn get_settings(&self) -> Result<Settings>;

    /// Replace the persisted state.
    fn save_settings(&self, settings: &Settings) -> Result<()>;
}

/// Settings stored as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "settings.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SettingsStore for JsonFileStore {
    fn get_settings(&self) -> Result<Settings> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file yet");
                return Ok(Settings::default());
            }
            Err(e) => return Err(SubsyncError::Io(e)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so readers never see a truncated document.
        let temp = self.temp_path();
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// In-memory settings, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: Mutex<Settings>,
    saves: Mutex<Vec<Settings>>,
}

impl MemoryStore {
    /// Create a store holding `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            saves: Mutex::new(Vec::new()),
        }
    }

    /// Every object passed to `save_settings`, oldest first.
    pub fn saves(&self) -> Vec<Settings> {
        self.saves.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of `save_settings` calls.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|s| s.len()).unwrap_or_default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_settings(&self) -> Result<Settings> {
        self.settings
            .lock()
            .map(|s| s.clone())
            .map_err(|_| SubsyncError::Config("settings lock poisoned".to_string()))
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        let mut current = self
            .settings
            .lock()
            .map_err(|_| SubsyncError::Config("settings lock poisoned".to_string()))?;
        *current = settings.clone();
        if let Ok(mut saves) = self.saves.lock() {
            saves.push(settings.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Subscription;
    use crate::source::Source;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("settings.json"));

        assert_eq!(store.get_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/dir/settings.json"));

        let mut settings = Settings::default();
        settings
            .sources
            .push(Source::new("a", "A", "https://a.example.com"));
        settings
            .subscriptions
            .push(Subscription::new("s", "S", "https://s.example.com"));
        settings.extra.insert("theme".to_string(), json!("dark"));

        store.save_settings(&settings).unwrap();

        assert_eq!(store.get_settings().unwrap(), settings);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get_settings(), Err(SubsyncError::Json(_))));
    }

    #[test]
    fn test_loose_entries_load_and_save_back_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let stored = json!({
            "sources": [{"id": "mine", "name": "My custom source", "api": "https://x", "priority": "high"}],
            "subscriptions": [{"id": "s", "url": "https://s", "lastUpdated": 1.5e12, "autoRefresh": "on"}],
            "theme": "dark",
            "history": [1, 2, 3]
        });
        fs::write(&path, stored.to_string()).unwrap();

        let store = JsonFileStore::new(&path);
        let settings = store.get_settings().unwrap();
        store.save_settings(&settings).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["sources"], stored["sources"]);
        assert_eq!(written["subscriptions"], stored["subscriptions"]);
        assert_eq!(written["theme"], json!("dark"));
        assert_eq!(written["history"], json!([1, 2, 3]));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = JsonFileStore::new("/data/settings.json");
        assert_eq!(store.temp_path(), PathBuf::from("/data/settings.json.tmp"));
    }

    #[test]
    fn test_memory_store_records_saves() {
        let store = MemoryStore::default();
        assert_eq!(store.save_count(), 0);

        let mut settings = Settings::default();
        settings.extra.insert("k".to_string(), json!(1));
        store.save_settings(&settings).unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.get_settings().unwrap(), settings);
        assert_eq!(store.saves(), vec![settings]);
    }
}
