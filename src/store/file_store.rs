use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ChartError, ChartResult};

use super::KeyValueStore;

/// Directory-backed store keeping one `<key>.json` file per key.
///
/// Writes land in a temporary sibling first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the store directory.
    pub fn open(root: impl Into<PathBuf>) -> ChartResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ChartError::InvalidData(format!(
                "failed to create store directory `{}`: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> ChartResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn validate_key(key: &str) -> ChartResult<()> {
    if key.is_empty() {
        return Err(ChartError::InvalidData(
            "storage key must not be empty".to_owned(),
        ));
    }
    if key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(ChartError::InvalidData(format!(
            "storage key `{key}` must not contain path separators"
        )));
    }
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ChartResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ChartError::storage(key, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> ChartResult<()> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|e| ChartError::storage(key, e))?;
        if let Err(err) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(ChartError::storage(key, err));
        }
        debug!(key, bytes = value.len(), path = %path.display(), "file store write");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ChartResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ChartError::storage(key, err)),
        }
    }
}
