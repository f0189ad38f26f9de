use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use dashsync_core::KeyValueStore;
use dashsync_domain::{DashSyncError, Result};
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::InfraError;

/// Key-value store persisted as a single JSON object on disk.
///
/// The whole document is held in memory. Every write serializes the updated
/// map to a temporary file in the same directory and renames it over the
/// original, so a crash mid-write leaves the previous document intact. A
/// write that fails to persist leaves the in-memory map unchanged too.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the document at `path`. A missing file is an empty store; it is
    /// created on the first write.
    ///
    /// # Errors
    /// `Serialization` if the file exists but is not a JSON object of
    /// strings, `Storage` if it cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                DashSyncError::Serialization(format!("{}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "preference file absent; starting empty");
                BTreeMap::new()
            }
            Err(err) => return Err(InfraError::from(err).into()),
        };

        info!(path = %path.display(), keys = entries.len(), "opened preference file");
        Ok(Self { path, entries: RwLock::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the map, persist it, then publish it.
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        if !change(&mut next) {
            return Ok(());
        }

        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(InfraError::from)?;

        let json = serde_json::to_vec_pretty(entries).map_err(InfraError::from)?;
        let mut file = NamedTempFile::new_in(&dir).map_err(InfraError::from)?;
        file.write_all(&json).map_err(InfraError::from)?;
        file.as_file().sync_all().map_err(InfraError::from)?;
        file.persist(&self.path).map_err(|err| InfraError::from(err.error))?;

        debug!(path = %self.path.display(), keys = entries.len(), "persisted preference file");
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn is_available(&self) -> bool {
        true
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
