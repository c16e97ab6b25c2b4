use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::dao::{settings_store::SettingsStore, storage::StorageResult};

/// Settings store kept in process memory, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemorySettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `record` under `key`.
    pub fn with_record(key: &str, record: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), record.into());
        store
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &str, record: &str) -> StorageResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(key.to_owned(), record.to_owned());
        Ok(())
    }
}
