// Layout store - Persists the panel arrangement with reset semantics
use crate::domain::layout::{LayoutSet, LayoutVersion};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key the layout document is stored under
pub const LAYOUT_KEY: &str = "dashboard-layout";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string key-value storage.
///
/// Calls are expected to be fast and are made directly from the caller's task.
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite any prior value under `key`
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

pub struct LayoutStore {
    storage: Arc<dyn KeyValueStore>,
    version: Mutex<LayoutVersion>,
}

impl LayoutStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            version: Mutex::new(LayoutVersion::default()),
        }
    }

    pub fn version(&self) -> LayoutVersion {
        *self.version.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Read the saved layout, falling back to the default when nothing usable
    /// is stored.
    pub fn load(&self) -> LayoutSet {
        let stored = match self.storage.get(LAYOUT_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::debug!("No saved layout in {}, using default", self.storage.name());
                return LayoutSet::default();
            }
            Err(e) => {
                tracing::warn!("Error reading saved layout from {}: {}", self.storage.name(), e);
                return LayoutSet::default();
            }
        };

        match serde_json::from_str::<LayoutSet>(&stored) {
            Ok(layouts) => layouts,
            Err(e) => {
                tracing::warn!("Error loading saved layout: {}", e);
                LayoutSet::default()
            }
        }
    }

    /// Persist the full layout set, replacing whatever was stored before.
    ///
    /// Returns whether the write reached storage; failures are logged only.
    pub fn save(&self, layouts: &LayoutSet) -> bool {
        let document = match serde_json::to_string(layouts) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Error serializing layout: {}", e);
                return false;
            }
        };

        match self.storage.set(LAYOUT_KEY, &document) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving layout to {}: {}", self.storage.name(), e);
                false
            }
        }
    }

    /// Drop the saved layout and bump the layout version
    pub fn reset(&self) -> (LayoutSet, LayoutVersion) {
        if let Err(e) = self.storage.remove(LAYOUT_KEY) {
            tracing::error!("Error clearing saved layout in {}: {}", self.storage.name(), e);
        }

        let mut version = self.version.lock().unwrap_or_else(|p| p.into_inner());
        *version = version.next();
        tracing::info!("Layout reset to default (version {})", version.0);

        (LayoutSet::default(), *version)
    }
}
