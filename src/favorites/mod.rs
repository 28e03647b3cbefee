use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use thiserror::Error;

/// Storage key holding the JSON array of favorited record ids.
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store file: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write store file: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store contents: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode store contents: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// Durable string key-value storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// A JSON object on disk, one string entry per key. Every `set` rewrites
/// the whole file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| StoreError::Decode { source: e })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // a corrupt file is replaced rather than blocking every later write
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StoreError::Decode { .. }) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        let encoded =
            serde_json::to_vec_pretty(&entries).map_err(|e| StoreError::Encode { source: e })?;
        let write_err = |e: std::io::Error| StoreError::Write {
            path: self.path.display().to_string(),
            source: e,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&self.path, encoded).map_err(write_err)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_entries()?.into_keys().collect())
    }
}

pub struct FavoritesStore {
    store: Box<dyn KeyValueStore>,
    /// Ids in the order they were starred.
    ids: IndexSet<String>,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

impl FavoritesStore {
    /// Reads the persisted set once. Missing or malformed data yields an
    /// empty set.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let ids = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed favorites");
                    IndexSet::new()
                }
            },
            Ok(None) => IndexSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favorites, starting empty");
                IndexSet::new()
            }
        };
        tracing::debug!(count = ids.len(), "favorites loaded");
        Self { store, ids }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Adds or removes `id` and persists the whole set. Returns whether the
    /// id is now a favorite. On a failed write the in-memory set keeps the
    /// change.
    pub fn toggle(&mut self, id: &str) -> Result<bool, StoreError> {
        let now_favorite = if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };
        self.persist()?;
        Ok(now_favorite)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn all(&self) -> &IndexSet<String> {
        &self.ids
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let ordered: Vec<&String> = self.ids.iter().collect();
        let encoded =
            serde_json::to_string(&ordered).map_err(|e| StoreError::Encode { source: e })?;
        self.store.set(FAVORITES_KEY, &encoded)
    }

    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }
}
