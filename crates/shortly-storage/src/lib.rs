//! Key-value store backends for the shortly registry.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use shortly_core::{KeyValueStore, StorageError};
