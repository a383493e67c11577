use crate::error::StorageError;

/// A minimal synchronous key-value store.
///
/// The registry keeps its whole mapping under a single key, so backends only
/// need to read and replace one string blob at a time. Implementations can
/// be in-memory maps, files on disk, or anything else with `get`/`set`.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key` as one unit.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
