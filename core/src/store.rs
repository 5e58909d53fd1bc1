use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::*;

/// Fixed storage slot for a persisted type.
pub trait StorageKey {
    const KEY: &'static str;
}

impl StorageKey for RoundSnapshot {
    const KEY: &'static str = "current_bet";
}

/// String key-value backend holding JSON documents.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&mut self, key: &str, value: String) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    fn load<T>(&self) -> Result<Option<T>>
    where
        Self: Sized,
        T: StorageKey + DeserializeOwned,
    {
        match self.read(T::KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Like [`load`](Self::load), falling back to `T::default()` when missing or unreadable.
    fn load_or_default<T>(&self) -> T
    where
        Self: Sized,
        T: StorageKey + DeserializeOwned + Default,
    {
        match self.load() {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                log::warn!("failed to load {}, using default: {}", T::KEY, err);
                T::default()
            }
        }
    }

    fn save<T>(&mut self, value: &T) -> Result<()>
    where
        Self: Sized,
        T: StorageKey + Serialize,
    {
        let json = serde_json::to_string(value)?;
        self.write(T::KEY, json)
    }

    fn clear<T>(&mut self) -> Result<()>
    where
        Self: Sized,
        T: StorageKey,
    {
        self.remove(T::KEY)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: String) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Volatile store, mostly for tests and embedding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug, PartialEq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: String) -> Result<()> {
        // rename is atomic, a crash mid-write leaves the previous document intact
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RoundSnapshot {
        RoundSnapshot {
            amount: 2.5,
            mine_indices: vec![0, 9],
            clicked_indices: vec![3, 4],
            mine_hit: false,
            mine_count: Some(2),
        }
    }

    #[test]
    fn memory_store_round_trips_snapshot() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load::<RoundSnapshot>(), Ok(None));

        store.save(&sample()).unwrap();
        assert!(store.contains("current_bet"));
        assert_eq!(store.load::<RoundSnapshot>(), Ok(Some(sample())));

        store.clear::<RoundSnapshot>().unwrap();
        assert_eq!(store.load::<RoundSnapshot>(), Ok(None));
    }

    #[test]
    fn undecodable_document_is_a_storage_error() {
        let mut store = MemoryStore::new();
        store.write("current_bet", "{not json".to_owned()).unwrap();

        assert!(matches!(
            store.load::<RoundSnapshot>(),
            Err(GameError::Storage(_))
        ));
        assert_eq!(
            store.load_or_default::<RoundSnapshot>(),
            RoundSnapshot::default()
        );
    }

    #[test]
    fn file_store_survives_a_fresh_handle() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FileStore::open(dir.path().join("state")).unwrap();
        store.save(&sample()).unwrap();

        let reopened = FileStore::open(dir.path().join("state")).unwrap();
        assert_eq!(reopened.load::<RoundSnapshot>(), Ok(Some(sample())));
        assert!(reopened.dir().join("current_bet.json").exists());
    }

    #[test]
    fn file_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        store.remove("current_bet").unwrap();
        store.save(&sample()).unwrap();
        store.clear::<RoundSnapshot>().unwrap();
        store.clear::<RoundSnapshot>().unwrap();

        assert_eq!(store.load::<RoundSnapshot>(), Ok(None));
    }
}
