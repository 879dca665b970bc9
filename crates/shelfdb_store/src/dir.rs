//! Directory-backed store for native persistence.

use crate::error::{StoreError, StoreResult};
use crate::store::{DurableStore, DEFAULT_MAX_VALUE_SIZE};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A store that keeps one file per key under a root directory.
///
/// Record layout on disk:
///
/// ```text
/// <root>/<key>.bin
/// ```
///
/// Writes go to a sibling `.tmp` file and are renamed into place, so a
/// reader never observes a partially-written record: until the rename
/// succeeds, `get` keeps returning the previous value.
///
/// Keys are restricted to `[A-Za-z0-9_-]` because they become file names.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    max_value_size: usize,
}

const RECORD_EXT: &str = "bin";

impl DirStore {
    /// Opens a directory store, creating the root directory if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_max_value_size(root, DEFAULT_MAX_VALUE_SIZE)
    }

    /// Opens a directory store with a custom per-value size ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_with_max_value_size(
        root: impl AsRef<Path>,
        max_value_size: usize,
    ) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            max_value_size,
        })
    }

    /// Returns the root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{RECORD_EXT}")))
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::invalid_key(key, "key is empty"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StoreError::invalid_key(
            key,
            "keys must match [A-Za-z0-9_-]+",
        ));
    }
    Ok(())
}

impl DurableStore for DirStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.record_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let path = self.record_path(key)?;
        if value.len() > self.max_value_size {
            return Err(StoreError::value_too_large(
                key,
                value.len(),
                self.max_value_size,
            ));
        }

        let tmp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(value)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem.starts_with(prefix) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn max_value_size(&self) -> usize {
        self.max_value_size
    }
}
