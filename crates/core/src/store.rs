//! String-keyed persistence for favorites, history and user-added games.

use std::{
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::StoreError;

/// Slot holding games added by the user, newest first.
pub const CUSTOM_GAMES_KEY: &str = "customGames";
/// Slot holding the favorite identifiers.
pub const FAVORITES_KEY: &str = "gameFavorites";
/// Slot holding the recently played games.
pub const RECENT_KEY: &str = "gameRecent";
/// Slot holding the selected colour theme.
pub const THEME_KEY: &str = "portalTheme";

/// Key-value store of serialized JSON strings.
pub trait PersistenceStore {
    /// Raw value for `key`, `None` if the slot is empty.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read and decode a slot. Missing, unreadable or malformed slots yield the
/// default value.
pub fn read_slot<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: PersistenceStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!(key, "Failed to read slot: {err}");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, "Ignoring malformed slot: {err}");
            T::default()
        }
    }
}

/// Encode and store a slot.
pub fn write_slot<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: PersistenceStore + ?Sized,
{
    let serialized = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &serialized)
}

/// Store keeping one `<key>.json` file per slot inside a directory.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the slot files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        let mut file = NamedTempFile::new_in(&self.root).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.persist(self.slot_path(key))
            .map_err(|source| StoreError::Persist {
                key: key.to_string(),
                source,
            })?;
        Ok(())
    }
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with raw slot values.
    pub fn with_slots<'a>(slots: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::default();
        {
            let mut inner = store.slots.write();
            for (key, value) in slots {
                inner.insert(key.to_string(), value.to_string());
            }
        }
        store
    }

    /// Raw value of a slot, for inspection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.read().get(key).cloned()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.read().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn sanitize_key(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
            result.push(ch);
        }
    }
    if result.is_empty() {
        "slot".to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let mut store = JsonFileStore::new(dir.path().join("data"));
        assert_eq!(store.get(FAVORITES_KEY)?, None);

        write_slot(&mut store, FAVORITES_KEY, &vec![1u64, 5])?;
        assert!(dir.path().join("data/gameFavorites.json").is_file());
        let favorites: Vec<u64> = read_slot(&store, FAVORITES_KEY);
        assert_eq!(favorites, vec![1, 5]);

        write_slot(&mut store, FAVORITES_KEY, &Vec::<u64>::new())?;
        let favorites: Vec<u64> = read_slot(&store, FAVORITES_KEY);
        assert!(favorites.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_slot_reads_as_default() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("gameRecent.json"), "{not json")?;
        let store = JsonFileStore::new(dir.path());
        let recent: Vec<u64> = read_slot(&store, RECENT_KEY);
        assert!(recent.is_empty());

        let memory = MemoryStore::with_slots([(FAVORITES_KEY, "\"oops\"")]);
        let favorites: Vec<u64> = read_slot(&memory, FAVORITES_KEY);
        assert!(favorites.is_empty());
        Ok(())
    }

    #[test]
    fn memory_store_clones_share_slots() -> Result<()> {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.set(THEME_KEY, "\"light\"")?;
        assert_eq!(store.raw(THEME_KEY).as_deref(), Some("\"light\""));
        Ok(())
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_key("../game Recent!"), "gameRecent");
        assert_eq!(sanitize_key("///"), "slot");
    }
}
