use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";
pub const DARK_MODE_KEY: &str = "darkMode";

/// Per-origin string key/value storage that outlives a page load.
pub trait FlagStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Absent or anything but exactly `"true"` reads as false.
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    values: BTreeMap<String, String>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct FlagFile {
    values: BTreeMap<String, String>,
}

/// Flags kept in a flat JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileFlagStore {
    path: PathBuf,
    file: FlagFile,
}

impl FileFlagStore {
    /// Opens the store. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = Self::read(&path).unwrap_or_else(|e| {
            log::warn!("[Flags] Failed to read {}: {}, starting empty", path.display(), e);
            FlagFile::default()
        });
        Self { path, file }
    }

    fn read(path: &Path) -> Result<FlagFile> {
        if !path.exists() {
            return Ok(FlagFile::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.file)?;

        // Write to tmp, then rename
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.file.values.get(key).cloned()
    }

    /// Memory only keeps the new value once it is on disk.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.file.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.file.values.insert(key.to_string(), old),
                None => self.file.values.remove(key),
            };
            return Err(e);
        }
        log::info!("[Flags] {} = {}", key, value);
        Ok(())
    }
}
