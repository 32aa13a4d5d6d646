//! Durable storage of the connected wallet labels.

use crate::error::StorageError;
use std::{fmt, sync::Arc};
use swap_config::SwapConfig;

mod file;
pub use file::FileStore;

mod memory;
pub use memory::MemoryStore;

/// Durable string key/value storage, the equivalent of browser local storage.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Reads and writes the ordered list of connected wallet labels under a fixed key.
///
/// The list is stored as a JSON array of strings, e.g. `["MetaMask","WalletConnect"]`.
#[derive(Clone, Debug)]
pub struct LabelStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl LabelStore {
    /// Creates a label store writing under [`SwapConfig::DEFAULT_STORAGE_KEY`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, SwapConfig::DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    /// The storage key the labels live under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrites the stored list with `labels`.
    pub fn save(&self, labels: &[String]) -> Result<(), StorageError> {
        let value = serde_json::to_string(labels)?;
        self.store.set(&self.key, &value)?;
        trace!(key = %self.key, ?labels, "saved wallet labels");
        Ok(())
    }

    /// Returns the stored list.
    ///
    /// A missing key, an unreadable store or a value that is not a JSON array of strings all
    /// yield an empty list.
    pub fn load(&self) -> Vec<String> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key = %self.key, %err, "failed to read wallet labels");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(labels) => labels,
            Err(err) => {
                warn!(key = %self.key, %err, "ignoring malformed wallet labels");
                Vec::new()
            }
        }
    }
}
