/// Persistence of the settings record.
pub mod settings_store;
/// Storage error types shared by every backend.
pub mod storage;
