mod file;
mod memory;

pub use self::file::FileSettingsStore;
pub use self::memory::MemorySettingsStore;

use crate::dao::storage::StorageResult;

/// Fixed identifier under which the settings record is stored.
pub const SETTINGS_KEY: &str = "floorball-scoreboard.settings";

/// Abstraction over wherever the settings record lives.
///
/// Records are opaque strings; parsing and sanitation happen in [`crate::config`].
pub trait SettingsStore: Send + Sync {
    /// Read the record stored under `key`, or `None` when nothing was saved yet.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replace the record stored under `key`.
    fn save(&self, key: &str, record: &str) -> StorageResult<()>;
}
