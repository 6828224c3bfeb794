//! String-keyed storage of word records.
//!
//! The tracker persists three kinds of values: the fluid registry buffer,
//! the preferences word and one daily log per calendar day. All of them go
//! through [`KeyValueStore`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Key holding the concatenated fluid records.
pub const FLUIDS_KEY: &str = "fluids";

/// Key holding the preferences word.
pub const PREFERENCES_KEY: &str = "prefs";

/// Errors that can occur while reading or writing the store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid store key '{0}': use ASCII letters, digits, '-' or '_'")]
    InvalidKey(String),

    #[error("Stored value for '{key}' has an odd byte length ({len})")]
    OddLength { key: String, len: usize },
}

/// A string-keyed key/value store of word records.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u16>>, StoreError>;

    /// Replaces whatever is stored under `key`.
    fn set(&mut self, key: &str, words: &[u16]) -> Result<(), StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Vec<u16>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u16>>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, words: &[u16]) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), words.to_vec());
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.values.contains_key(key))
    }
}

/// Store backed by one file per key in a data directory.
///
/// Each file holds the words of one value, little-endian.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `data_dir`. The directory is created on the
    /// first write.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the file path for `key`.
    pub fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.rec", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u16>>, StoreError> {
        let path = self.path(key)?;

        match fs::read(&path) {
            Ok(bytes) => {
                if bytes.len() % 2 != 0 {
                    return Err(StoreError::OddLength {
                        key: key.to_string(),
                        len: bytes.len(),
                    });
                }
                let words = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                Ok(Some(words))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, words: &[u16]) -> Result<(), StoreError> {
        let path = self.path(key)?;

        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::Io {
            path: self.data_dir.clone(),
            source: e,
        })?;

        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        fs::write(&path, bytes).map_err(|e| StoreError::Io { path, source: e })?;
        tracing::debug!("Wrote {} word(s) to '{}'", words.len(), key);

        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.path(key)?.exists())
    }
}
