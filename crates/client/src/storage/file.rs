//! On-disk store: one JSON file per key inside a namespace directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{PersistentStore, StorageError};

const EXTENSION: &str = "json";

/// A [`PersistentStore`] that keeps each key in `<root>/<namespace>/<key>.json`.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// crash mid-write leaves the previous value intact. The directory is created
/// lazily on first write.
///
/// Two processes pointed at the same directory are not coordinated: the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`, scoped to `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` if `namespace` is not a plain name.
    pub fn new(root: impl AsRef<Path>, namespace: &str) -> Result<Self, StorageError> {
        validate_key(namespace)?;
        Ok(Self {
            dir: root.as_ref().join(namespace),
        })
    }

    /// Directory holding this store's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let temp_path = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }

        // Atomic rename
        fs::rename(&temp_path, &path)?;
        debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some(EXTENSION) {
                fs::remove_file(&path)?;
            }
        }

        debug!(dir = %self.dir.display(), "cleared store");
        Ok(())
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_none() {
        let root = tempfile::tempdir().unwrap();
        let store = FileStore::new(root.path(), "shopfront").unwrap();
        assert!(store.get("user").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_a_new_instance() {
        let root = tempfile::tempdir().unwrap();
        FileStore::new(root.path(), "shopfront")
            .unwrap()
            .set("shoppingCart", r#"{"shoppingCart":[],"lastModified":null}"#)
            .unwrap();

        let reopened = FileStore::new(root.path(), "shopfront").unwrap();
        assert_eq!(
            reopened.get("shoppingCart").unwrap().as_deref(),
            Some(r#"{"shoppingCart":[],"lastModified":null}"#)
        );
        assert!(root.path().join("shopfront/shoppingCart.json").exists());
    }

    #[test]
    fn test_set_overwrites_without_leaving_temp_files() {
        let root = tempfile::tempdir().unwrap();
        let store = FileStore::new(root.path(), "shopfront").unwrap();
        store.set("user", "1").unwrap();
        store.set("user", "2").unwrap();

        assert_eq!(store.get("user").unwrap().as_deref(), Some("2"));
        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("user.json")]);
    }

    #[test]
    fn test_clear_is_scoped_to_namespace() {
        let root = tempfile::tempdir().unwrap();
        let ours = FileStore::new(root.path(), "shopfront").unwrap();
        let theirs = FileStore::new(root.path(), "other").unwrap();

        ours.set("user", "{}").unwrap();
        ours.set("shoppingCart", "{}").unwrap();
        theirs.set("user", "{}").unwrap();

        ours.clear().unwrap();

        assert!(ours.get("user").unwrap().is_none());
        assert!(ours.get("shoppingCart").unwrap().is_none());
        assert!(theirs.get("user").unwrap().is_some());
    }

    #[test]
    fn test_clear_before_first_write() {
        let root = tempfile::tempdir().unwrap();
        let store = FileStore::new(root.path(), "shopfront").unwrap();
        store.clear().unwrap();
        store.remove("user").unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let root = tempfile::tempdir().unwrap();
        let store = FileStore::new(root.path(), "shopfront").unwrap();
        assert!(matches!(
            store.set("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            FileStore::new(root.path(), ""),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
