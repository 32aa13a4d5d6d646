use super::KeyValueStore;
use crate::error::StorageError;
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use swap_config::SwapConfig;

/// Storage backed by a single JSON object file.
///
/// Writes go to a sibling temp file that is renamed over the original, so a crash never leaves
/// a half-written file behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, creating its parent directory if necessary.
    ///
    /// The file itself is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
        }
        Ok(Self { path, lock: Mutex::new(()) })
    }

    /// Opens the store at the config's [`storage_file`](SwapConfig::storage_file).
    pub fn from_config(config: &SwapConfig) -> Result<Self, StorageError> {
        let path = config.storage_file().ok_or(StorageError::NoDataDir)?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(StorageError::io(&self.path, err)),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp, contents).map_err(|err| StorageError::io(&tmp, err))?;
        fs::rename(&tmp, &self.path).map_err(|err| StorageError::io(&self.path, err))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Json(err)) => {
                warn!(path = ?self.path, %err, "replacing corrupt storage file");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}
