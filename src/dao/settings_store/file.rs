use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use tracing::debug;

use crate::dao::{
    settings_store::SettingsStore,
    storage::{StorageError, StorageResult},
};

/// Settings store writing one `<key>.json` file per record inside a directory.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    /// Store records inside `dir`, creating it on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.record_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), "loaded settings record");
                Ok(Some(contents))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::unavailable(
                format!("reading {}", path.display()),
                err,
            )),
        }
    }

    fn save(&self, key: &str, record: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            StorageError::unavailable(format!("creating {}", self.dir.display()), err)
        })?;

        // Write next to the target and rename so a crash never leaves a half-written record.
        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, record)
            .map_err(|err| StorageError::unavailable(format!("writing {}", tmp.display()), err))?;
        fs::rename(&tmp, &path).map_err(|err| {
            StorageError::unavailable(format!("replacing {}", path.display()), err)
        })?;

        debug!(path = %path.display(), "saved settings record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_record_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings"));
        assert_eq!(store.load("settings").unwrap(), None);
    }

    #[test]
    fn save_creates_directory_and_overwrites() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("config");
        let store = FileSettingsStore::new(&dir);

        store.save("settings", "first").unwrap();
        store.save("settings", "second").unwrap();
        assert_eq!(store.load("settings").unwrap().as_deref(), Some("second"));
        assert!(dir.join("settings.json").exists());
        assert!(!dir.join("settings.json.tmp").exists());
    }

    #[test]
    fn unreadable_record_reports_unavailable() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("settings.json")).unwrap();
        let store = FileSettingsStore::new(dir.path());

        let err = store.load("settings").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
