//! File-based key/value storage.
//!
//! Each key is one file in `~/.ariza/local/` (or a configured directory).
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{Result, StorageError};
use crate::storage::KeyValueStore;
use crate::util::read_to_string_limited;

/// File-based key/value store.
///
/// The directory is created on first write, so construction never touches
/// the filesystem.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    /// Directory where value files are stored.
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the path for a key's file.
    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", sanitize_key(key)))
    }

    /// Write a value atomically using temp file + rename.
    fn atomic_write(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| StorageError::storage(&self.dir, e))?;
        }

        let final_path = self.value_path(key);
        let temp_path = self.temp_path(key);

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| StorageError::storage(&temp_path, e))?;
            file.write_all(value.as_bytes())
                .map_err(|e| StorageError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| StorageError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| StorageError::storage(&final_path, e))?;

        Ok(())
    }
}

/// Map a key to a safe file stem.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key);

        if !path.exists() {
            return Ok(None);
        }

        read_to_string_limited(&path).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.atomic_write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(key);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}
