use shortly_core::{KeyValueStore, StorageError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

/// File-backed implementation of [`KeyValueStore`].
///
/// Each key lives in its own file, `<dir>/<key>.json`. Every write goes to
/// its own uniquely named temp file in the same directory, which is then
/// renamed over the target. Readers see either the old blob or the new one,
/// never a torn write, and concurrent writers never share a temp file. The
/// rename is only atomic within one filesystem, which holds since both paths
/// share a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory the store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }
    if key == "." || key == ".." || key.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidKey(format!(
            "key must not contain path separators: '{}'",
            key
        )));
    }
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => {
                trace!(path = %path.display(), bytes = contents.len(), "read blob");
                Ok(Some(contents))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                trace!(path = %path.display(), "no blob stored yet");
                Ok(None)
            }
            Err(err) => Err(StorageError::Io(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        fs::create_dir_all(&self.dir).map_err(|err| {
            StorageError::Unavailable(format!(
                "failed to create {}: {err}",
                self.dir.display()
            ))
        })?;

        // The temp file is removed on drop if any step below fails.
        let write = || -> std::io::Result<()> {
            let mut temp = NamedTempFile::new_in(&self.dir)?;
            temp.write_all(value.as_bytes())?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|err| err.error)?;
            Ok(())
        };

        write().map_err(|err| {
            StorageError::Io(format!("failed to write {}: {err}", path.display()))
        })?;

        debug!(path = %path.display(), bytes = value.len(), "wrote blob");
        Ok(())
    }
}
