//! JSON-file store: one file per key in a state directory

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{StateStore, StoreKey, StoredValue};
use crate::Result;

/// A [`StateStore`] that keeps each key in `<dir>/<key>.json`.
///
/// The whole file is rewritten on every save. A store-wide mutex is held
/// across each call, so a load never reads a half-written file through this
/// store instance.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (creating if needed) a state directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "state store open");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Directory holding the state files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl StateStore for JsonFileStore {
    fn save(&self, key: StoreKey, value: &StoredValue) -> Result<()> {
        let _guard = self.lock.lock();
        let json = serde_json::to_string(value)?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }

    fn load(&self, key: StoreKey) -> Result<Option<StoredValue>> {
        let _guard = self.lock.lock();
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }
}
