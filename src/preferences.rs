//! Durable client-local preference slots.
//!
//! The theme controller only ever touches one slot, but the store is a small
//! string key/value map so it can be swapped for an in-memory fake.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value slot storage
pub trait PreferenceStore {
    fn get(&self, slot: &str) -> Option<String>;

    fn set(&mut self, slot: &str, value: &str) -> Result<()>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, slot: &str) -> Option<String> {
        (**self).get(slot)
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<()> {
        (**self).set(slot, value)
    }
}

/// Preferences file format
#[derive(Debug, Serialize, Deserialize)]
struct PreferencesFile {
    version: u32,
    slots: BTreeMap<String, String>,
}

impl Default for PreferencesFile {
    fn default() -> Self {
        Self {
            version: 1,
            slots: BTreeMap::new(),
        }
    }
}

/// JSON file backed store. Every `set` writes through to disk.
pub struct FileStore {
    slots: BTreeMap<String, String>,
    path: PathBuf,
}

impl FileStore {
    /// Get the default preferences file path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cyber-cemetery")
            .join("preferences.json")
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            slots: BTreeMap::new(),
            path,
        };
        store.load()?;
        Ok(store)
    }

    fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            tracing::debug!("No preferences file found, starting fresh");
            return Ok(());
        }

        let content = fs::read_to_string(&self.path).context("Failed to read preferences file")?;

        let file: PreferencesFile =
            serde_json::from_str(&content).context("Failed to parse preferences file")?;

        self.slots = file.slots;
        tracing::debug!("Loaded {} preference slots", self.slots.len());
        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create preferences directory")?;
        }

        let file = PreferencesFile {
            version: 1,
            slots: self.slots.clone(),
        };

        let content =
            serde_json::to_string_pretty(&file).context("Failed to serialize preferences")?;

        fs::write(&self.path, content).context("Failed to write preferences file")?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, slot: &str) -> Option<String> {
        self.slots.get(slot).cloned()
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<()> {
        self.slots.insert(slot.to_string(), value.to_string());
        self.save()
    }
}

/// Process-lifetime store for `--no-persist` and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, slot: &str) -> Option<String> {
        self.slots.get(slot).cloned()
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<()> {
        self.slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}
