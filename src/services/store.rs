use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when reading or writing the data files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Duplicated record: {0}")]
    Duplicated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of a write, as reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    None,
    Duplicated,
    ServiceError,
}

impl ErrorCode {
    pub fn of<T>(result: &Result<T, StorageError>) -> Self {
        match result {
            Ok(_) => ErrorCode::None,
            Err(e) => e.code(),
        }
    }
}

impl StorageError {
    /// Collapse into the closed set of outcomes; a missing record is a service error
    pub fn code(&self) -> ErrorCode {
        match self {
            StorageError::Duplicated(_) => ErrorCode::Duplicated,
            _ => ErrorCode::ServiceError,
        }
    }
}

/// Map of records persisted as one JSON object in one file
///
/// Every mutation reads the whole file, changes the map in memory and writes
/// the whole file back. There is no locking between processes.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    pretty: bool,
    _record: PhantomData<T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all records; a missing or unreadable file yields an empty map
    pub fn load(&self) -> BTreeMap<String, T> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Invalid data file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }

    /// Read all records; a missing file is empty, a corrupt one is an error
    pub fn try_load(&self) -> Result<BTreeMap<String, T>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    /// Replace the file contents with `records`
    ///
    /// Writes a sibling temp file and renames it over the target, so a failed
    /// write leaves the previous contents in place.
    pub fn save(&self, records: &BTreeMap<String, T>) -> Result<(), StorageError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(records)?
        } else {
            serde_json::to_string(records)?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::trace!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.load().remove(id)
    }

    /// Add a record under a fresh id
    pub fn insert(&self, id: &str, record: T) -> Result<(), StorageError> {
        let mut records = self.try_load()?;
        if records.contains_key(id) {
            return Err(StorageError::Duplicated(id.to_string()));
        }
        records.insert(id.to_string(), record);
        self.save(&records)
    }

    /// Overwrite an existing record
    pub fn replace(&self, id: &str, record: T) -> Result<(), StorageError> {
        let mut records = self.try_load()?;
        match records.get_mut(id) {
            Some(slot) => *slot = record,
            None => return Err(StorageError::NotFound(id.to_string())),
        }
        self.save(&records)
    }

    /// Mutate an existing record in place and return the new value
    pub fn update<F>(&self, id: &str, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut T),
        T: Clone,
    {
        let mut records = self.try_load()?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        f(record);
        let updated = record.clone();
        self.save(&records)?;
        Ok(updated)
    }

    pub fn remove(&self, id: &str) -> Result<T, StorageError> {
        let mut records = self.try_load()?;
        let removed = records
            .remove(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        self.save(&records)?;
        Ok(removed)
    }

    /// Remove every record matching `predicate`, returning how many went
    pub fn remove_where<P>(&self, predicate: P) -> Result<usize, StorageError>
    where
        P: Fn(&T) -> bool,
    {
        let mut records = self.try_load()?;
        let before = records.len();
        records.retain(|_, record| !predicate(record));
        let removed = before - records.len();
        if removed > 0 {
            self.save(&records)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Note {
        Note { text: text.to_string() }
    }

    fn store(dir: &tempfile::TempDir) -> JsonStore<Note> {
        JsonStore::new(dir.path().join("data").join("notes.json"), true)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(!store.exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty_but_blocks_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().is_empty());
        let result = store.insert("a", note("hello"));
        assert_eq!(ErrorCode::of(&result), ErrorCode::ServiceError);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_insert_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.insert("a", note("first")).unwrap();

        let result = store.insert("a", note("second"));
        assert_eq!(ErrorCode::of(&result), ErrorCode::Duplicated);
        assert_eq!(store.get("a"), Some(note("first")));
    }

    #[test]
    fn test_replace_update_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.insert("a", note("first")).unwrap();

        store.replace("a", note("second")).unwrap();
        assert_eq!(store.get("a"), Some(note("second")));

        let updated = store.update("a", |n| n.text.push('!')).unwrap();
        assert_eq!(updated, note("second!"));

        assert_eq!(store.remove("a").unwrap(), note("second!"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_missing_id_is_service_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.insert("a", note("first")).unwrap();

        let result = store.remove("zzz");
        assert_eq!(ErrorCode::of(&result), ErrorCode::ServiceError);
        let result = store.replace("zzz", note("x"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_remove_where() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.insert("a", note("keep")).unwrap();
        store.insert("b", note("drop")).unwrap();
        store.insert("c", note("drop")).unwrap();

        assert_eq!(store.remove_where(|n| n.text == "drop").unwrap(), 2);
        assert_eq!(store.load().len(), 1);
    }
}
