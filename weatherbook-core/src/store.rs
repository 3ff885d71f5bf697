//! Duplicate-safe, persisted collections.
//!
//! A [`CollectionStore`] keeps its items in insertion order, refuses items
//! whose identity key is already present, and rewrites its whole backend
//! after every mutation. Persistence is best effort: unreadable or corrupt
//! data loads as an empty collection and failed writes are only logged.

use serde::{Serialize, de::DeserializeOwned};

pub mod backend;

pub use backend::{BlobStore, FileBlob, KeyValueFile, KeyValueStore, KeyedBlob, MemoryBlob};

/// Items with a stable identity key used for membership checks.
pub trait Keyed {
    fn key(&self) -> String;
}

#[derive(Debug)]
pub struct CollectionStore<T> {
    name: &'static str,
    items: Vec<T>,
    backend: Box<dyn BlobStore>,
}

impl<T> CollectionStore<T>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    /// Open a store over `backend`, loading whatever it currently holds.
    pub fn open(name: &'static str, backend: Box<dyn BlobStore>) -> Self {
        let mut store = Self { name, items: Vec::new(), backend };
        store.items = store.load_all();
        tracing::debug!("Loaded {} {}", store.items.len(), store.name);
        store
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Append `item` unless its key is taken. Returns whether it was added.
    pub fn add(&mut self, item: T) -> bool {
        let key = item.key();
        if self.contains(&key) {
            tracing::debug!("{} already holds {key}", self.name);
            return false;
        }

        self.items.push(item);
        tracing::info!("Added {key} to {}", self.name);
        self.persist_all(&self.items);
        true
    }

    /// Drop every item keyed `key`. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != key);
        let removed = self.items.len() != before;
        if removed {
            tracing::info!("Removed {key} from {}", self.name);
        }

        self.persist_all(&self.items);
        removed
    }

    /// Read the backend. Missing or undecodable data yields an empty list.
    pub fn load_all(&self) -> Vec<T> {
        let bytes = match self.backend.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read {}: {e:#}", self.name);
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Discarding unreadable {}: {e}", self.name);
                Vec::new()
            }
        }
    }

    /// Replace the backend contents with `items`. Failures are logged only.
    pub fn persist_all(&self, items: &[T]) {
        let bytes = match serde_json::to_vec(items) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Could not encode {}: {e}", self.name);
                return;
            }
        };

        if let Err(e) = self.backend.write(&bytes) {
            tracing::warn!("Could not save {}: {e:#}", self.name);
        }
    }
}
