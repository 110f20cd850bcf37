//! Storage utilities for Slow Computer apps
//!
//! Apps persist their state as a handful of named slices. Each slice is an
//! opaque JSON document read and written independently.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("File not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key/value backend holding serialized slices.
pub trait SliceStore {
    /// Raw contents of a slice, `None` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slice wholesale.
    fn write(&mut self, key: &str, contents: &str) -> Result<()>;

    /// Drop a slice. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One pretty-printed JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDir {
    root: PathBuf,
}

impl JsonDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl SliceStore for JsonDir {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        // Write beside the target then rename so a crash never leaves half a slice.
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory backend, used by tests and by hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slices: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }
}

impl SliceStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slices.get(key).cloned())
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        self.slices.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slices.remove(key);
        Ok(())
    }
}

/// Read and deserialize a slice. `Ok(None)` when the slice is absent.
pub fn load_slice<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: SliceStore + ?Sized,
{
    match store.read(key)? {
        Some(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        None => Ok(None),
    }
}

/// Like [`load_slice`], but a corrupt or unreadable slice falls back to the
/// default instead of failing the whole load.
pub fn load_slice_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: SliceStore + ?Sized,
{
    match load_slice(store, key) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            log::warn!("ignoring unreadable slice '{key}': {e}");
            T::default()
        }
    }
}

/// Entries of a list slice, loaded one by one.
#[derive(Debug)]
pub struct ListLoad<T> {
    pub entries: Vec<T>,
    /// Raw JSON that could not be read back, in stored order. A slice that is
    /// not an array at all shows up here as a single string.
    pub rejected: Vec<serde_json::Value>,
}

impl<T> Default for ListLoad<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Read a list slice without letting one bad entry take the rest down.
pub fn load_list<T, S>(store: &S, key: &str) -> Result<ListLoad<T>>
where
    T: DeserializeOwned,
    S: SliceStore + ?Sized,
{
    let Some(contents) = store.read(key)? else {
        return Ok(ListLoad::default());
    };
    let values = match serde_json::from_str::<Vec<serde_json::Value>>(&contents) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("slice '{key}' is not a list: {e}");
            return Ok(ListLoad {
                entries: Vec::new(),
                rejected: vec![serde_json::Value::String(contents)],
            });
        }
    };

    let mut load = ListLoad::default();
    for (index, value) in values.into_iter().enumerate() {
        match <T as serde::Deserialize>::deserialize(&value) {
            Ok(entry) => load.entries.push(entry),
            Err(e) => {
                log::warn!("skipping entry {index} of '{key}': {e}");
                load.rejected.push(value);
            }
        }
    }
    Ok(load)
}

/// Append raw entries to a list slice, keeping whatever it already holds.
pub fn set_aside<S>(store: &mut S, key: &str, rejected: Vec<serde_json::Value>) -> Result<()>
where
    S: SliceStore + ?Sized,
{
    if rejected.is_empty() {
        return Ok(());
    }
    let mut kept = match store.read(key)? {
        Some(contents) => serde_json::from_str::<Vec<serde_json::Value>>(&contents)
            .unwrap_or_else(|_| vec![serde_json::Value::String(contents)]),
        None => Vec::new(),
    };
    kept.extend(rejected);
    save_slice(store, key, &kept)
}

/// Serialize and write a slice.
pub fn save_slice<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: SliceStore + ?Sized,
{
    let contents = serde_json::to_string_pretty(value)?;
    store.write(key, &contents)
}

/// Read a whole file that must exist, e.g. a document picked for import.
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Write a document, creating parent directories as needed.
pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Get the config directory for Slow Computer apps
pub fn config_dir(app_name: &str) -> PathBuf {
    directories::ProjectDirs::from("co", "slowcomputer", app_name)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the documents directory
pub fn documents_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}
