//! Core types and traits for the shortly link registry.
//!
//! This crate provides the types shared by the generator, the storage
//! backends and the registry itself: slugs, link records, the error
//! taxonomy, the key-value store seam, the clock seam and the URL safety
//! heuristic.

pub mod clock;
pub mod error;
pub mod record;
pub mod safety;
pub mod slug;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RegistryError, StorageError};
pub use record::{LinkMap, LinkRecord};
pub use safety::{evaluate_safety, SafetyWarning};
pub use slug::Slug;
pub use store::KeyValueStore;
