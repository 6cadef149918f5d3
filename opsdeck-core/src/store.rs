use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::{CoreError, CoreResult};

pub const USERS_KEY: &str = "users";
pub const ROLES_KEY: &str = "roles";

/// Key-based persistence for whole collections. A registry persists its full
/// collection after every mutation, so `save` always replaces the record.
pub trait Store {
    /// Load the collection stored under `key`. Absent or unreadable data
    /// degrades to an empty collection rather than failing.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T>;

    /// Replace the collection stored under `key`.
    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> CoreResult<()>;
}

impl<S: Store> Store for &S {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        <S as Store>::load(*self, key)
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> CoreResult<()> {
        <S as Store>::save(*self, key, items)
    }
}

/// One pretty-printed `<key>.json` file per record under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Platform data directory for opsdeck, e.g. `~/.local/share/opsdeck`.
    pub fn default_dir() -> CoreResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| CoreError::storage("Could not determine data directory"))?;
        Ok(base.join("opsdeck"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for JsonFileStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let path = self.record_path(key);
        if !path.exists() {
            return Vec::new();
        }

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) => {
                warn!("Failed to read {:?}, starting empty: {err}", path);
                return Vec::new();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(items) => items,
            Err(err) => {
                warn!("Ignoring unreadable {key} record at {:?}: {err}", path);
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> CoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_vec_pretty(items)?;
        write_atomic(&self.record_path(key), &data)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> CoreResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// In-memory store for tests and embedders that do not want a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let records = self.lock();
        let Some(raw) = records.get(key) else {
            return Vec::new();
        };

        match serde_json::from_str(raw) {
            Ok(items) => items,
            Err(err) => {
                warn!("Ignoring unreadable in-memory {key} record: {err}");
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> CoreResult<()> {
        let raw = serde_json::to_string(items)?;
        self.lock().insert(key.to_string(), raw);
        Ok(())
    }
}
