//! Load-list / save-list substrates behind [`CollectionStore`](super::CollectionStore).

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

/// An opaque blob that is read whole and replaced whole.
pub trait BlobStore: Send + Sync + Debug {
    /// Current contents, `None` when nothing was ever written.
    fn read(&self) -> Result<Option<Vec<u8>>>;
    fn write(&self, bytes: &[u8]) -> Result<()>;
}

/// A single file. Writes go to a sibling temp file that is renamed over the
/// target, so readers see either the old or the new contents.
#[derive(Debug, Clone)]
pub struct FileBlob {
    path: PathBuf,
}

impl FileBlob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl BlobStore for FileBlob {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!("Failed to move {} into place at {}", tmp.display(), self.path.display())
        })?;

        Ok(())
    }
}

/// Small string values stored under string keys.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Key-value store kept as one JSON object in a file.
#[derive(Debug, Clone)]
pub struct KeyValueFile {
    file: FileBlob,
}

impl KeyValueFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { file: FileBlob::new(path) }
    }

    fn entries(&self) -> Result<BTreeMap<String, String>> {
        match self.file.read()? {
            Some(bytes) => serde_json::from_slice(&bytes).with_context(|| {
                format!("Failed to parse key-value file: {}", self.file.path().display())
            }),
            None => Ok(BTreeMap::new()),
        }
    }
}

impl KeyValueStore for KeyValueFile {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries().unwrap_or_else(|e| {
            tracing::warn!("Starting a fresh key-value file: {e:#}");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value);

        let bytes = serde_json::to_vec_pretty(&entries).context("Failed to encode key-value file")?;
        self.file.write(&bytes)
    }
}

/// One key of a [`KeyValueStore`], viewed as a blob.
#[derive(Debug, Clone)]
pub struct KeyedBlob {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KeyedBlob {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }
}

impl BlobStore for KeyedBlob {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(&self.key)?.map(String::into_bytes))
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        let value = String::from_utf8(bytes.to_vec())
            .with_context(|| format!("Value for {:?} is not UTF-8", self.key))?;
        self.store.set(&self.key, value)
    }
}

/// In-process blob. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlob {
    contents: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryBlob {
    pub fn with_contents(bytes: Vec<u8>) -> Self {
        Self { contents: Arc::new(Mutex::new(Some(bytes))) }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().clone()
    }
}

impl BlobStore for MemoryBlob {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        *self.contents.lock() = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;
    use crate::store::CollectionStore;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let blob = FileBlob::new(dir.path().join("absent.json"));
        assert!(blob.read().unwrap().is_none());
    }

    #[test]
    fn file_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let blob = FileBlob::new(dir.path().join("nested").join("weather_snapshots.json"));

        blob.write(b"[1]").unwrap();
        blob.write(b"[2]").unwrap();

        assert_eq!(blob.read().unwrap().as_deref(), Some(&b"[2]"[..]));
        assert!(!blob.temp_path().exists());
    }

    #[test]
    fn key_value_file_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let kv = KeyValueFile::new(dir.path().join("preferences.json"));

        kv.set("favoriteLocations", "[]".into()).unwrap();
        kv.set("lastQuery", "Paris".into()).unwrap();

        assert_eq!(kv.get("favoriteLocations").unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.get("lastQuery").unwrap().as_deref(), Some("Paris"));
        assert_eq!(kv.get("missing").unwrap(), None);
    }

    #[test]
    fn keyed_blob_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KeyValueStore> =
            Arc::new(KeyValueFile::new(dir.path().join("preferences.json")));
        let blob = KeyedBlob::new(kv.clone(), "favoriteLocations");

        assert!(blob.read().unwrap().is_none());
        blob.write(br#"["x"]"#).unwrap();
        assert_eq!(kv.get("favoriteLocations").unwrap().as_deref(), Some(r#"["x"]"#));
    }

    #[test]
    fn corrupt_favorites_blob_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let kv: Arc<dyn KeyValueStore> = Arc::new(KeyValueFile::new(&path));
        kv.set("favoriteLocations", "[{\"lat\": 1".into()).unwrap();

        let store: CollectionStore<Location> =
            CollectionStore::open("favorites", Box::new(KeyedBlob::new(kv, "favoriteLocations")));
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_snapshot_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather_snapshots.json");
        fs::write(&path, "garbage").unwrap();

        let store: CollectionStore<crate::model::Snapshot> =
            CollectionStore::open("snapshots", Box::new(FileBlob::new(&path)));
        assert!(store.is_empty());
    }
}
